use serde::Deserialize;

/// A structured line printed by an external tool on stdout.
///
/// ```text
/// {"type":"progress","current":3,"total":12}
/// {"type":"result","success":false,"error":"codec not supported"}
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ToolMessage {
    Progress {
        current: u64,
        total: u64,
    },
    Result {
        success: bool,
        #[serde(default)]
        error: Option<String>,
    },
}

impl ToolMessage {
    /// Parses one stdout line; anything that is not a tool message is `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('{') {
            return None;
        }
        serde_json::from_str(line).ok()
    }
}
