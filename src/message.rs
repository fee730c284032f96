//! Inbound messages, as a host patch would send them.
//!
//! One message per line: a selector followed by space separated atoms, e.g.
//! `channel 10 255 128` or `blackout 1`. A line that starts with a number is
//! a bare list (or a bare int/float when it holds a single value).

use std::fmt;
use std::str::FromStr;

use crate::dmx::DmxClient;
use crate::error::{MessageError, OutputError};
use crate::frame::{clamp_level, round_level};
use crate::output::OlaOutput;

/// One element of a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Int(i64),
    Float(f64),
    Symbol(String),
}

impl Atom {
    /// The DMX level this atom stands for: integers clamp, floats round then
    /// clamp, symbols have none.
    pub fn level(&self) -> Option<i64> {
        match self {
            Atom::Int(value) => Some(i64::from(clamp_level(*value))),
            Atom::Float(value) => Some(i64::from(clamp_level(round_level(*value)))),
            Atom::Symbol(_) => None,
        }
    }

    /// Integer reading of a numeric argument. Floats truncate toward zero.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Atom::Int(value) => Some(*value),
            Atom::Float(value) => Some(value.trunc() as i64),
            Atom::Symbol(_) => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Atom::Int(value) => Some(*value as f64),
            Atom::Float(value) => Some(*value),
            Atom::Symbol(_) => None,
        }
    }

    /// Read one token: integers first, then finite floats, anything else is
    /// a symbol.
    pub fn parse(token: &str) -> Atom {
        if let Ok(value) = token.parse::<i64>() {
            return Atom::Int(value);
        }
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Atom::Float(value),
            _ => Atom::Symbol(token.to_string()),
        }
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Atom::Symbol(value.to_string())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Int(value) => write!(f, "{}", value),
            Atom::Float(value) => write!(f, "{}", value),
            Atom::Symbol(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Values for consecutive channels starting at DMX channel 1.
    List(Vec<Atom>),
    /// A single value for DMX channel 1.
    Int(i64),
    Float(f64),
    /// 1-based start channel followed by the values to write from there.
    Channel { start: Atom, values: Vec<Atom> },
    Universe(i64),
    Blackout(i64),
    Connect,
    State,
}

impl Message {
    /// Run this message against `output`. Validation failures come back as
    /// errors; transport failures are reported by the output itself.
    pub fn apply<C: DmxClient>(self, output: &mut OlaOutput<C>) -> Result<(), OutputError> {
        match self {
            Message::List(values) => {
                output.set_channels(&values);
            }
            Message::Int(value) => {
                output.set_channel(0, value);
            }
            Message::Float(value) => {
                output.set_channel(0, round_level(value));
            }
            Message::Channel { start, values } => {
                output.set_channels_from_offset(&start, &values)?;
            }
            Message::Universe(universe) => {
                output.set_universe(universe)?;
            }
            Message::Blackout(value) => {
                output.set_blackout(value > 0);
            }
            Message::Connect => {
                output.connect();
            }
            Message::State => output.report_state(),
        }
        Ok(())
    }
}

fn single_arg<T>(
    selector: &'static str,
    args: &[Atom],
    read: impl Fn(&Atom) -> Option<T>,
) -> Result<T, MessageError> {
    let atom = args.first().ok_or(MessageError::MissingArgument(selector))?;
    read(atom).ok_or_else(|| MessageError::NotANumber {
        selector,
        value: atom.to_string(),
    })
}

impl FromStr for Message {
    type Err = MessageError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let first = tokens.next().ok_or(MessageError::Empty)?;
        let args: Vec<Atom> = tokens.map(Atom::parse).collect();

        match Atom::parse(first) {
            Atom::Int(value) if args.is_empty() => return Ok(Message::Int(value)),
            Atom::Float(value) if args.is_empty() => return Ok(Message::Float(value)),
            atom @ (Atom::Int(_) | Atom::Float(_)) => {
                let mut values = Vec::with_capacity(args.len() + 1);
                values.push(atom);
                values.extend(args);
                return Ok(Message::List(values));
            }
            Atom::Symbol(_) => {}
        }

        match first {
            "list" => Ok(Message::List(args)),
            "int" => Ok(Message::Int(single_arg("int", &args, Atom::as_long)?)),
            "float" => Ok(Message::Float(single_arg("float", &args, Atom::as_float)?)),
            "channel" => {
                let mut args = args.into_iter();
                let start = args.next().ok_or(MessageError::MissingArgument("channel"))?;
                Ok(Message::Channel {
                    start,
                    values: args.collect(),
                })
            }
            "universe" => Ok(Message::Universe(single_arg("universe", &args, Atom::as_long)?)),
            "blackout" => Ok(Message::Blackout(single_arg("blackout", &args, Atom::as_long)?)),
            "connect" => Ok(Message::Connect),
            "state" => Ok(Message::State),
            other => Err(MessageError::UnknownSelector(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Message {
        line.parse().unwrap()
    }

    #[test]
    fn atoms_coerce_to_levels() {
        assert_eq!(Atom::Int(999).level(), Some(255));
        assert_eq!(Atom::Int(-3).level(), Some(0));
        assert_eq!(Atom::Float(127.5).level(), Some(128));
        assert_eq!(Atom::Float(127.49).level(), Some(127));
        assert_eq!(Atom::from("red").level(), None);
    }

    #[test]
    fn atom_parsing() {
        assert_eq!(Atom::parse("12"), Atom::Int(12));
        assert_eq!(Atom::parse("-1.5"), Atom::Float(-1.5));
        assert_eq!(Atom::parse("inf"), Atom::from("inf"));
        assert_eq!(Atom::parse("NaN"), Atom::from("NaN"));
        assert_eq!(Atom::Float(-2.9).as_long(), Some(-2));
    }

    #[test]
    fn selectors() {
        assert_eq!(
            parse("list 1 2.5 x"),
            Message::List(vec![Atom::Int(1), Atom::Float(2.5), Atom::from("x")])
        );
        assert_eq!(parse("int 300"), Message::Int(300));
        assert_eq!(parse("float 3"), Message::Float(3.0));
        assert_eq!(parse("universe 7"), Message::Universe(7));
        assert_eq!(parse("blackout 1"), Message::Blackout(1));
        assert_eq!(parse("  connect  "), Message::Connect);
        assert_eq!(parse("state"), Message::State);
        assert_eq!(
            parse("channel 10 255 0"),
            Message::Channel {
                start: Atom::Int(10),
                values: vec![Atom::Int(255), Atom::Int(0)],
            }
        );
    }

    #[test]
    fn bare_numbers() {
        assert_eq!(parse("42"), Message::Int(42));
        assert_eq!(parse("0.75"), Message::Float(0.75));
        assert_eq!(
            parse("1 2 3"),
            Message::List(vec![Atom::Int(1), Atom::Int(2), Atom::Int(3)])
        );
    }

    #[test]
    fn channel_keeps_non_integer_start_for_validation() {
        assert_eq!(
            parse("channel 1.5 9"),
            Message::Channel {
                start: Atom::Float(1.5),
                values: vec![Atom::Int(9)],
            }
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!("".parse::<Message>(), Err(MessageError::Empty));
        assert_eq!(
            "dim 4".parse::<Message>(),
            Err(MessageError::UnknownSelector("dim".to_string()))
        );
        assert_eq!("channel".parse::<Message>(), Err(MessageError::MissingArgument("channel")));
        assert_eq!("universe".parse::<Message>(), Err(MessageError::MissingArgument("universe")));
        assert_eq!(
            "blackout on".parse::<Message>(),
            Err(MessageError::NotANumber {
                selector: "blackout",
                value: "on".to_string(),
            })
        );
    }
}
