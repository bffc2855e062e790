//! Page orientation of the composite and its automatic selection.
//!
//! Only the first capture is inspected: every capture of a job comes from the
//! same camera and shares its aspect ratio.
//!
//! | Captures | Portrait capture | Landscape capture |
//! |---|---|---|
//! | 1, 4 | portrait page | landscape page |
//! | 2, 3 | landscape page | portrait page |
//!
//! Two or three captures are laid out as a strip, which inverts the natural
//! page orientation relative to a single photo.

use super::backend::Dimensions;
use super::factory::ComposeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested or resolved page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Auto,
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Auto => "auto",
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }

    pub fn is_landscape(self) -> bool {
        self == Orientation::Landscape
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Orientation::Auto),
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            _ => Err(ComposeError::InvalidOrientation(s.to_string())),
        }
    }
}

/// Pick the page orientation best suited to `captures`.
///
/// Never returns [`Orientation::Auto`]. Fails with
/// [`ComposeError::InvalidCaptureCount`] unless there are 1 to 4 captures.
pub fn select_orientation(captures: &[Dimensions]) -> Result<Orientation, ComposeError> {
    let first = match (captures.len(), captures.first()) {
        (1..=4, Some(first)) => first,
        (count, _) => return Err(ComposeError::InvalidCaptureCount(count)),
    };
    let is_portrait = first.width < first.height;

    let orientation = match (captures.len(), is_portrait) {
        (1 | 4, true) | (2 | 3, false) => Orientation::Portrait,
        _ => Orientation::Landscape,
    };
    Ok(orientation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTRAIT: Dimensions = Dimensions {
        width: 1934,
        height: 2464,
    };
    const LANDSCAPE: Dimensions = Dimensions {
        width: 2464,
        height: 1934,
    };
    const SQUARE: Dimensions = Dimensions {
        width: 1000,
        height: 1000,
    };

    #[test]
    fn one_and_four_mirror_capture() {
        for count in [1, 4] {
            assert_eq!(
                select_orientation(&vec![PORTRAIT; count]).unwrap(),
                Orientation::Portrait
            );
            assert_eq!(
                select_orientation(&vec![LANDSCAPE; count]).unwrap(),
                Orientation::Landscape
            );
        }
    }

    #[test]
    fn two_and_three_invert_capture() {
        for count in [2, 3] {
            assert_eq!(
                select_orientation(&vec![PORTRAIT; count]).unwrap(),
                Orientation::Landscape
            );
            assert_eq!(
                select_orientation(&vec![LANDSCAPE; count]).unwrap(),
                Orientation::Portrait
            );
        }
    }

    #[test]
    fn square_counts_as_landscape_capture() {
        assert_eq!(select_orientation(&[SQUARE]).unwrap(), Orientation::Landscape);
        assert_eq!(select_orientation(&[SQUARE, SQUARE]).unwrap(), Orientation::Portrait);
    }

    #[test]
    fn only_first_capture_is_inspected() {
        assert_eq!(
            select_orientation(&[PORTRAIT, LANDSCAPE, LANDSCAPE, LANDSCAPE]).unwrap(),
            Orientation::Portrait
        );
    }

    #[test]
    fn counts_outside_range_fail() {
        for count in [0, 5, 8] {
            let result = select_orientation(&vec![PORTRAIT; count]);
            assert!(
                matches!(result, Err(ComposeError::InvalidCaptureCount(n)) if n == count),
                "count {count} gave {result:?}"
            );
        }
    }

    #[test]
    fn parse_orientation_names() {
        assert_eq!("auto".parse::<Orientation>().unwrap(), Orientation::Auto);
        assert_eq!(" Portrait ".parse::<Orientation>().unwrap(), Orientation::Portrait);
        assert_eq!("LANDSCAPE".parse::<Orientation>().unwrap(), Orientation::Landscape);
    }

    #[test]
    fn parse_unknown_orientation_fails() {
        let err = "diagonal".parse::<Orientation>().unwrap_err();
        assert!(matches!(err, ComposeError::InvalidOrientation(ref s) if s == "diagonal"));
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for o in [Orientation::Auto, Orientation::Portrait, Orientation::Landscape] {
            assert_eq!(o.to_string().parse::<Orientation>().unwrap(), o);
        }
    }
}
