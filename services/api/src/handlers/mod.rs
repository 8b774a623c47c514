//! Request handlers, grouped by resource

pub mod albums;
pub mod apod;
pub mod auth;
pub mod users;

use chrono::NaiveDate;
use common::AppError;

/// Parse a `YYYY-MM-DD` request parameter
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request(format!("invalid date {:?}, expected YYYY-MM-DD", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        for raw in ["", "2024-2-30", "02/01/2024", "2023-02-29", "today"] {
            assert_eq!(parse_date(raw).unwrap_err().status().as_u16(), 400);
        }
    }
}
