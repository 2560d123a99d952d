use std::collections::BTreeMap;

/// Every command the interpreter understands. Dispatch is a lookup in this
/// closed set; anything else is reported as an unknown command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    Navigate,
    AskUser,
    ClickXpath,
    TypeXpath,
    ReadXpath,
    ClickTagged,
    TypeTagged,
    ReadTagged,
    PressKeyTagged,
    SaveToVariable,
    FindAndSave,
    GenerateComment,
    ReadPage,
    Screenshot,
}

impl CommandKind {
    pub const ALL: [CommandKind; 14] = [
        CommandKind::Navigate,
        CommandKind::AskUser,
        CommandKind::ClickXpath,
        CommandKind::TypeXpath,
        CommandKind::ReadXpath,
        CommandKind::ClickTagged,
        CommandKind::TypeTagged,
        CommandKind::ReadTagged,
        CommandKind::PressKeyTagged,
        CommandKind::SaveToVariable,
        CommandKind::FindAndSave,
        CommandKind::GenerateComment,
        CommandKind::ReadPage,
        CommandKind::Screenshot,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Navigate => "NAVIGATE",
            Self::AskUser => "ASK_USER",
            Self::ClickXpath => "CLICK_XPATH",
            Self::TypeXpath => "TYPE_XPATH",
            Self::ReadXpath => "READ_XPATH",
            Self::ClickTagged => "CLICK_TAGGED",
            Self::TypeTagged => "TYPE_TAGGED",
            Self::ReadTagged => "READ_TAGGED",
            Self::PressKeyTagged => "PRESS_KEY_TAGGED",
            Self::SaveToVariable => "SAVE_TO_VARIABLE",
            Self::FindAndSave => "FIND_AND_SAVE",
            Self::GenerateComment => "GENERATE_COMMENT",
            Self::ReadPage => "READ_PAGE",
            Self::Screenshot => "SCREENSHOT",
        }
    }

    /// Parameter names in the order the builder UI should ask for them.
    pub fn params(self) -> &'static [&'static str] {
        match self {
            Self::Navigate => &["URL"],
            Self::AskUser => &["Prompt"],
            Self::ClickXpath | Self::ReadXpath => &["XPath"],
            Self::TypeXpath => &["XPath", "Text"],
            Self::ClickTagged | Self::ReadTagged => &["Tag"],
            Self::TypeTagged => &["Tag", "Text"],
            Self::PressKeyTagged => &["Tag", "Key"],
            Self::SaveToVariable => &["Variable Name", "Value"],
            Self::FindAndSave => &["URL", "Query", "Variable Name"],
            Self::GenerateComment => &["Context"],
            Self::ReadPage => &[],
            Self::Screenshot => &["Path"],
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(keyword))
    }

    /// Commands whose output can be stored by `SAVE_TO_VARIABLE`.
    pub fn is_value_producer(self) -> bool {
        matches!(
            self,
            Self::ReadXpath | Self::ReadTagged | Self::GenerateComment | Self::ReadPage
        )
    }
}

pub fn supported_commands() -> BTreeMap<String, Vec<String>> {
    CommandKind::ALL
        .into_iter()
        .map(|kind| {
            (
                kind.keyword().to_string(),
                kind.params().iter().map(|name| name.to_string()).collect(),
            )
        })
        .collect()
}
