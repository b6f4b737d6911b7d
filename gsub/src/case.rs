use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

/// Separator between namespace segments in a module name (`FooBar::Baz`)
const MODULE_NAME_SEPARATOR: &str = "::";

/// Separator between segments in a module path (`foo_bar/baz`)
const MODULE_PATH_SEPARATOR: &str = "/";

/// A case convention used to derive extra search/replace pairs.
///
/// Variants are declared in the order their rules are added to a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseStyle {
    /// `git_gsub`
    Snake,
    /// `git-gsub`
    Kebab,
    /// `GitGsub`
    Camel,
    /// `GitGsub`
    UpperCamel,
    /// `gitGsub`
    LowerCamel,
    /// `GIT_GSUB`
    ScreamingSnake,
    /// `FooBar::Baz` becomes `foo_bar/baz`
    ModulePath,
    /// `foo_bar/baz` becomes `FooBar::Baz`
    ModuleName,
}

impl CaseStyle {
    /// Styles enabled by `--all`. The module group is deliberately absent.
    pub const ALL: [CaseStyle; 3] = [CaseStyle::Snake, CaseStyle::Kebab, CaseStyle::Camel];

    /// Styles enabled by `--ruby`
    pub const MODULE: [CaseStyle; 2] = [CaseStyle::ModulePath, CaseStyle::ModuleName];

    /// Converts `text` into this case convention
    pub fn apply(self, text: &str) -> String {
        match self {
            CaseStyle::Snake => text.to_snake_case(),
            CaseStyle::Kebab => text.to_kebab_case(),
            CaseStyle::Camel | CaseStyle::UpperCamel => text.to_upper_camel_case(),
            CaseStyle::LowerCamel => text.to_lower_camel_case(),
            CaseStyle::ScreamingSnake => text.to_shouty_snake_case(),
            CaseStyle::ModulePath => to_module_path(text),
            CaseStyle::ModuleName => to_module_name(text),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CaseStyle::Snake => "snake",
            CaseStyle::Kebab => "kebab",
            CaseStyle::Camel => "camel",
            CaseStyle::UpperCamel => "upper-camel",
            CaseStyle::LowerCamel => "lower-camel",
            CaseStyle::ScreamingSnake => "screaming-snake",
            CaseStyle::ModulePath => "module-path",
            CaseStyle::ModuleName => "module-name",
        }
    }
}

fn module_segments(text: &str) -> impl Iterator<Item = &str> {
    text.split(MODULE_NAME_SEPARATOR)
        .flat_map(|segment| segment.split(MODULE_PATH_SEPARATOR))
}

/// `FooBar::Baz` (or `FooBar/Baz`) to `foo_bar/baz`
pub fn to_module_path(text: &str) -> String {
    module_segments(text)
        .map(|segment| segment.to_snake_case())
        .collect::<Vec<_>>()
        .join(MODULE_PATH_SEPARATOR)
}

/// `foo_bar/baz` (or `foo_bar::baz`) to `FooBar::Baz`
pub fn to_module_name(text: &str) -> String {
    module_segments(text)
        .map(|segment| segment.to_upper_camel_case())
        .collect::<Vec<_>>()
        .join(MODULE_NAME_SEPARATOR)
}
