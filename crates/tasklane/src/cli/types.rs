//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::DependencyType;
use crate::render::RenderFormat;

/// Dependency type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyTypeArg {
    /// Hard blocker, takes part in scheduling
    Blocks,
    /// Informational link
    #[value(name = "relates-to", alias = "relates_to")]
    RelatesTo,
    /// Marks a duplicate
    Duplicates,
}

impl std::fmt::Display for DependencyTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocks => write!(f, "blocks"),
            Self::RelatesTo => write!(f, "relates-to"),
            Self::Duplicates => write!(f, "duplicates"),
        }
    }
}

impl From<DependencyTypeArg> for DependencyType {
    fn from(arg: DependencyTypeArg) -> Self {
        match arg {
            DependencyTypeArg::Blocks => Self::Blocks,
            DependencyTypeArg::RelatesTo => Self::RelatesTo,
            DependencyTypeArg::Duplicates => Self::Duplicates,
        }
    }
}

/// Visualization format for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormatArg {
    /// Indented tree
    Tree,
    /// Critical path chain
    Ascii,
    /// Graphviz DOT
    Dot,
}

impl std::fmt::Display for RenderFormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", RenderFormat::from(*self))
    }
}

impl From<RenderFormatArg> for RenderFormat {
    fn from(arg: RenderFormatArg) -> Self {
        match arg {
            RenderFormatArg::Tree => Self::Tree,
            RenderFormatArg::Ascii => Self::Ascii,
            RenderFormatArg::Dot => Self::Dot,
        }
    }
}
