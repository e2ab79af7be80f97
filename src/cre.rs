//! Cre driver line → targeted cortical layer.
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Transgenic Cre lines imaged in the excitatory-population datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreLine {
    Cux2CreErt2,
    Emx1IresCre,
    Nr5a1Cre,
    Rbp4CreKl100,
    RorbIres2Cre,
    Scnn1aTg3Cre,
}

impl CreLine {
    pub const ALL: [CreLine; 6] = [
        CreLine::Cux2CreErt2,
        CreLine::Emx1IresCre,
        CreLine::Nr5a1Cre,
        CreLine::Rbp4CreKl100,
        CreLine::RorbIres2Cre,
        CreLine::Scnn1aTg3Cre,
    ];

    /// Name as it appears in the experiment listing.
    pub fn name(self) -> &'static str {
        match self {
            CreLine::Cux2CreErt2 => "Cux2-CreERT2",
            CreLine::Emx1IresCre => "Emx1-IRES-Cre",
            CreLine::Nr5a1Cre => "Nr5a1-Cre",
            CreLine::Rbp4CreKl100 => "Rbp4-Cre_KL100",
            CreLine::RorbIres2Cre => "Rorb-IRES2-Cre",
            CreLine::Scnn1aTg3Cre => "Scnn1a-Tg3-Cre",
        }
    }

    pub fn layer(self) -> &'static str {
        match self {
            CreLine::Cux2CreErt2 => "Layer 2/3 & 4",
            CreLine::Emx1IresCre => "Pan excitatory expression",
            CreLine::Nr5a1Cre => "Layer 4",
            CreLine::Rbp4CreKl100 => "Layer 5",
            CreLine::RorbIres2Cre => "Layer 4",
            CreLine::Scnn1aTg3Cre => "Layer 4",
        }
    }
}

impl fmt::Display for CreLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CreLine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CreLine::ALL
            .into_iter()
            .find(|line| line.name() == s)
            .ok_or_else(|| Error::UnknownCreLine(s.to_string()))
    }
}

/// Layer string for a Cre line name; unknown names are an error.
pub fn cre_to_layer(cre_line: &str) -> Result<&'static str> {
    Ok(cre_line.parse::<CreLine>()?.layer())
}
