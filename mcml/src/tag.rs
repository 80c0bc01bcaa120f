use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Every tag name the language knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum TagName {
    // File structure
    Start,
    Direction,
    Setup,
    Teardown,
    Spawning,
    Startup,
    Reset,
    Blocks,
    Section,
    Name,
    Relative,
    X,
    Y,
    Z,
    // Placement flags
    Impulse,
    Chain,
    Repeating,
    Conditional,
    Auto,
}

impl TagName {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn open(self) -> String {
        format!("<{}>", self.as_str())
    }

    pub fn close(self) -> String {
        format!("</{}>", self.as_str())
    }
}

/// A line consisting of exactly one opening or closing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagLine {
    Open(TagName),
    Close(TagName),
}

impl TagLine {
    /// Parse `<name>` or `</name>`. `Err` carries the unrecognized name.
    pub fn parse(text: &str) -> Result<TagLine, String> {
        let inner = text
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .ok_or_else(|| text.to_string())?;
        let (closing, name) = match inner.strip_prefix('/') {
            Some(name) => (true, name),
            None => (false, inner),
        };
        let tag: TagName = name.parse().map_err(|_| name.to_string())?;
        Ok(if closing {
            TagLine::Close(tag)
        } else {
            TagLine::Open(tag)
        })
    }
}

/// Placement flags that may wrap content lines.
///
/// `Impulse`, `Chain` and `Repeating` select the block type and exclude one
/// another; `Conditional` and `Auto` are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Flag {
    Impulse,
    Chain,
    Repeating,
    Conditional,
    Auto,
}

impl Flag {
    pub fn from_tag(tag: TagName) -> Option<Flag> {
        Some(match tag {
            TagName::Impulse => Flag::Impulse,
            TagName::Chain => Flag::Chain,
            TagName::Repeating => Flag::Repeating,
            TagName::Conditional => Flag::Conditional,
            TagName::Auto => Flag::Auto,
            _ => return None,
        })
    }

    pub fn is_trigger(self) -> bool {
        matches!(self, Flag::Impulse | Flag::Chain | Flag::Repeating)
    }
}

/// The five fixed header blocks, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Header {
    Setup,
    Teardown,
    Spawning,
    Startup,
    Reset,
}

impl Header {
    pub fn tag(self) -> TagName {
        match self {
            Header::Setup => TagName::Setup,
            Header::Teardown => TagName::Teardown,
            Header::Spawning => TagName::Spawning,
            Header::Startup => TagName::Startup,
            Header::Reset => TagName::Reset,
        }
    }

    /// Position in file order, starting at 0.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
