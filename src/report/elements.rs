use serde::{Deserialize, Serialize};

/// Closed vocabulary of element codes reported by the lab.
///
/// The serialized form (`ca`, `no3`, ...) is the stable field name used by
/// stored test rows and by the scoring consumers, so variants must never be
/// renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Salinity,
    Kh,

    Cl,
    Na,
    Mg,
    S,
    Ca,
    K,
    Br,
    Sr,
    B,
    F,

    Li,
    Si,
    I,
    Ba,
    Mo,
    Ni,
    Mn,
    As,
    Be,
    Cr,
    Co,
    Fe,
    Cu,
    Se,
    Ag,
    V,
    Zn,
    Sn,

    No3,
    P,
    Po4,

    Al,
    Sb,
    Bi,
    Pb,
    Cd,
    La,
    Tl,
    Ti,
    W,
    Hg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementGroup {
    Base,
    Major,
    Minor,
    Nutrient,
    Pollutant,
}

impl ElementGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementGroup::Base => "base",
            ElementGroup::Major => "major",
            ElementGroup::Minor => "minor",
            ElementGroup::Nutrient => "nutrient",
            ElementGroup::Pollutant => "pollutant",
        }
    }
}

impl Element {
    pub const ALL: [Element; 43] = [
        Element::Salinity,
        Element::Kh,
        Element::Cl,
        Element::Na,
        Element::Mg,
        Element::S,
        Element::Ca,
        Element::K,
        Element::Br,
        Element::Sr,
        Element::B,
        Element::F,
        Element::Li,
        Element::Si,
        Element::I,
        Element::Ba,
        Element::Mo,
        Element::Ni,
        Element::Mn,
        Element::As,
        Element::Be,
        Element::Cr,
        Element::Co,
        Element::Fe,
        Element::Cu,
        Element::Se,
        Element::Ag,
        Element::V,
        Element::Zn,
        Element::Sn,
        Element::No3,
        Element::P,
        Element::Po4,
        Element::Al,
        Element::Sb,
        Element::Bi,
        Element::Pb,
        Element::Cd,
        Element::La,
        Element::Tl,
        Element::Ti,
        Element::W,
        Element::Hg,
    ];

    /// Storage code, identical to the serialized name.
    pub fn code(self) -> &'static str {
        match self {
            Element::Salinity => "salinity",
            Element::Kh => "kh",
            Element::Cl => "cl",
            Element::Na => "na",
            Element::Mg => "mg",
            Element::S => "s",
            Element::Ca => "ca",
            Element::K => "k",
            Element::Br => "br",
            Element::Sr => "sr",
            Element::B => "b",
            Element::F => "f",
            Element::Li => "li",
            Element::Si => "si",
            Element::I => "i",
            Element::Ba => "ba",
            Element::Mo => "mo",
            Element::Ni => "ni",
            Element::Mn => "mn",
            Element::As => "as",
            Element::Be => "be",
            Element::Cr => "cr",
            Element::Co => "co",
            Element::Fe => "fe",
            Element::Cu => "cu",
            Element::Se => "se",
            Element::Ag => "ag",
            Element::V => "v",
            Element::Zn => "zn",
            Element::Sn => "sn",
            Element::No3 => "no3",
            Element::P => "p",
            Element::Po4 => "po4",
            Element::Al => "al",
            Element::Sb => "sb",
            Element::Bi => "bi",
            Element::Pb => "pb",
            Element::Cd => "cd",
            Element::La => "la",
            Element::Tl => "tl",
            Element::Ti => "ti",
            Element::W => "w",
            Element::Hg => "hg",
        }
    }

    pub fn group(self) -> ElementGroup {
        match self {
            Element::Salinity | Element::Kh => ElementGroup::Base,
            Element::Cl
            | Element::Na
            | Element::Mg
            | Element::S
            | Element::Ca
            | Element::K
            | Element::Br
            | Element::Sr
            | Element::B
            | Element::F => ElementGroup::Major,
            Element::No3 | Element::P | Element::Po4 => ElementGroup::Nutrient,
            Element::Al
            | Element::Sb
            | Element::Bi
            | Element::Pb
            | Element::Cd
            | Element::La
            | Element::Tl
            | Element::Ti
            | Element::W
            | Element::Hg => ElementGroup::Pollutant,
            _ => ElementGroup::Minor,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Element::Salinity => "ppt",
            Element::Kh => "dKH",
            _ => match self.group() {
                ElementGroup::Major | ElementGroup::Nutrient => "mg/l",
                _ => "ug/l",
            },
        }
    }

    /// Labels that open this element's line in the report table. Matched
    /// case-sensitively so that `Ca` never picks up a `CA` heading.
    pub fn line_labels(self) -> &'static [&'static str] {
        match self {
            Element::Salinity => &["Sal. total", "Salinity"],
            Element::Kh => &["KH", "Alkalinity"],
            Element::Cl => &["Cl"],
            Element::Na => &["Na"],
            Element::Mg => &["Mg"],
            Element::S => &["S"],
            Element::Ca => &["Ca"],
            Element::K => &["K"],
            Element::Br => &["Br"],
            Element::Sr => &["Sr"],
            Element::B => &["B"],
            Element::F => &["F"],
            Element::Li => &["Li"],
            Element::Si => &["Si"],
            Element::I => &["I"],
            Element::Ba => &["Ba"],
            Element::Mo => &["Mo"],
            Element::Ni => &["Ni"],
            Element::Mn => &["Mn"],
            Element::As => &["As"],
            Element::Be => &["Be"],
            Element::Cr => &["Cr"],
            Element::Co => &["Co"],
            Element::Fe => &["Fe"],
            Element::Cu => &["Cu"],
            Element::Se => &["Se"],
            Element::Ag => &["Ag"],
            Element::V => &["V"],
            Element::Zn => &["Zn"],
            Element::Sn => &["Sn"],
            Element::No3 => &["NO3"],
            Element::P => &["P"],
            Element::Po4 => &["PO4"],
            Element::Al => &["Al"],
            Element::Sb => &["Sb"],
            Element::Bi => &["Bi"],
            Element::Pb => &["Pb"],
            Element::Cd => &["Cd"],
            Element::La => &["La"],
            Element::Tl => &["Tl"],
            Element::Ti => &["Ti"],
            Element::W => &["W"],
            Element::Hg => &["Hg"],
        }
    }

    /// Returns the text following one of this element's labels when `line`
    /// opens with it.
    pub fn strip_label<'a>(self, line: &'a str) -> Option<&'a str> {
        let trimmed = line.trim_start();
        self.line_labels().iter().find_map(|label| {
            let rest = trimmed.strip_prefix(label)?;
            let boundary = rest
                .chars()
                .next()
                .map(|character| !character.is_ascii_alphanumeric())
                .unwrap_or(true);
            boundary.then_some(rest)
        })
    }
}
