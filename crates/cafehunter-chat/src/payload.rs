//! Command payloads carried by quick replies and postback buttons.
//!
//! The wire form is `ACTION:ARG`. Only the first colon separates the action
//! from its argument, so arguments may contain further colons.

use std::fmt;
use std::str::FromStr;

use cafehunter_core::types::Coordinate;

use crate::error::PayloadError;

const FIND_CAFE_GEOCODING: &str = "FIND_CAFE_GEOCODING";
const FIND_CAFE_LOCATION: &str = "FIND_CAFE_LOCATION";
const FIND_CAFE: &str = "FIND_CAFE";
const CANCEL: &str = "CANCEL";
const KIDDING: &str = "KIDDING";
const GET_STARTED: &str = "GET_STARTED";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Search around a point.
    FindCafeAt(Coordinate),
    /// Resolve a place phrase again.
    FindCafeNear(String),
    /// The user wants a cafe but has not said where.
    FindCafe,
    Cancel,
    Kidding,
    GetStarted,
}

impl Command {
    pub fn action(&self) -> &'static str {
        match self {
            Command::FindCafeAt(_) => FIND_CAFE_GEOCODING,
            Command::FindCafeNear(_) => FIND_CAFE_LOCATION,
            Command::FindCafe => FIND_CAFE,
            Command::Cancel => CANCEL,
            Command::Kidding => KIDDING,
            Command::GetStarted => GET_STARTED,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::FindCafeAt(point) => write!(f, "{}:{}", self.action(), point),
            Command::FindCafeNear(phrase) => write!(f, "{}:{}", self.action(), phrase),
            _ => f.write_str(self.action()),
        }
    }
}

impl FromStr for Command {
    type Err = PayloadError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let (action, arg) = match payload.split_once(':') {
            Some((action, arg)) => (action, Some(arg)),
            None => (payload, None),
        };

        match action {
            FIND_CAFE_GEOCODING => {
                let arg = arg.ok_or_else(|| malformed(action, "missing coordinates"))?;
                parse_coordinate(arg)
                    .map(Command::FindCafeAt)
                    .map_err(|reason| malformed(action, reason))
            }
            FIND_CAFE_LOCATION => match arg.map(str::trim) {
                Some(phrase) if !phrase.is_empty() => {
                    Ok(Command::FindCafeNear(phrase.to_string()))
                }
                _ => Err(malformed(action, "missing place name")),
            },
            FIND_CAFE => Ok(Command::FindCafe),
            CANCEL => Ok(Command::Cancel),
            KIDDING => Ok(Command::Kidding),
            GET_STARTED => Ok(Command::GetStarted),
            other => Err(PayloadError::UnknownAction(other.to_string())),
        }
    }
}

fn malformed(action: &str, reason: &str) -> PayloadError {
    PayloadError::MalformedArgument {
        action: action.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_coordinate(arg: &str) -> Result<Coordinate, &'static str> {
    let (lat, long) = arg.split_once(',').ok_or("expected lat,long")?;
    let lat: f64 = lat.trim().parse().map_err(|_| "latitude is not a number")?;
    let long: f64 = long.trim().parse().map_err(|_| "longitude is not a number")?;
    let point = Coordinate::new(lat, long);
    if point.is_valid() {
        Ok(point)
    } else {
        Err("coordinates out of range")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(payload: &str) -> Result<Command, PayloadError> {
        payload.parse()
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(
            parse("FIND_CAFE_GEOCODING:25.0421,121.5074").unwrap(),
            Command::FindCafeAt(Coordinate::new(25.0421, 121.5074))
        );
    }

    #[test]
    fn test_coordinates_survive_display_and_parse() {
        let command = Command::FindCafeAt(Coordinate::new(25.033964123456789, 121.56447198765432));
        let payload = command.to_string();
        assert!(payload.starts_with("FIND_CAFE_GEOCODING:25.033964123456789,"));
        assert_eq!(parse(&payload).unwrap(), command);
    }

    #[test]
    fn test_first_colon_is_the_only_delimiter() {
        assert_eq!(
            parse("FIND_CAFE_LOCATION:Exit 2: Taipei Main Station").unwrap(),
            Command::FindCafeNear("Exit 2: Taipei Main Station".to_string())
        );
    }

    #[test]
    fn test_bare_actions() {
        assert_eq!(parse("FIND_CAFE").unwrap(), Command::FindCafe);
        assert_eq!(parse("CANCEL").unwrap(), Command::Cancel);
        assert_eq!(parse("KIDDING").unwrap(), Command::Kidding);
        assert_eq!(parse("GET_STARTED").unwrap(), Command::GetStarted);
        assert_eq!(Command::Cancel.to_string(), "CANCEL");
    }

    #[test]
    fn test_malformed_coordinates() {
        for payload in [
            "FIND_CAFE_GEOCODING",
            "FIND_CAFE_GEOCODING:",
            "FIND_CAFE_GEOCODING:25.04",
            "FIND_CAFE_GEOCODING:north,121.5",
            "FIND_CAFE_GEOCODING:25.04,east",
            "FIND_CAFE_GEOCODING:95.0,121.5",
        ] {
            assert!(
                matches!(parse(payload), Err(PayloadError::MalformedArgument { .. })),
                "{} should be malformed",
                payload
            );
        }
    }

    #[test]
    fn test_empty_place_name_is_malformed() {
        assert!(matches!(
            parse("FIND_CAFE_LOCATION:  "),
            Err(PayloadError::MalformedArgument { .. })
        ));
    }

    #[test]
    fn test_unknown_action() {
        assert_eq!(
            parse("ORDER_LATTE:large").unwrap_err(),
            PayloadError::UnknownAction("ORDER_LATTE".to_string())
        );
        assert!(matches!(parse(""), Err(PayloadError::UnknownAction(_))));
    }
}
