//! Default values shared across the registry, configuration and CLI.

/// Directory, relative to the filesystem root, searched for templates when no
/// base path is configured.
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";

/// File extension (without the leading dot) appended to logical template names.
pub const DEFAULT_TEMPLATE_EXT: &str = "html";

/// Name of the optional configuration file read by the CLI.
pub const CONFIG_FILE_NAME: &str = "templator.toml";

/// Names that are never treated as fields of the bound data type.
///
/// `loop` is Tera's builtin loop variable; the boolean literals would otherwise
/// look like bare identifiers to the surface scan.
pub const RESERVED_NAMES: &[&str] = &["loop", "true", "false", "True", "False", "__tera_context"];
