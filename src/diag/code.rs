// Message code taxonomy, minimum set from spec §4.2 and §7.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MessageCode {
    // Structural
    Expected,
    UnknownModifier,
    UnclosedInlineModifier,
    // Stylistic (warnings)
    UnnecessaryNewline,
    NewBlockShouldBeOnNewline,
    ContentShouldBeOnNewline,
    // Argument
    InvalidArgument,
    ArgumentCountMismatch,
    // Definition
    NameAlreadyDefined,
    // Expansion
    ReachedReparseLimit,
    // Wrapper marker; real code lives on the innermost `Message::Direct`.
    Referred,
}

impl std::fmt::Display for MessageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
