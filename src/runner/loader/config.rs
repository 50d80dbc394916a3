//! Loader configuration file parsing.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::runner::ds::error::LoaderError;
use crate::runner::ds::value::Value;
use crate::runner::loader::interop::InteropPolicy;
use crate::runner::loader::path::{BareModules, PathResolver};

pub const DEFAULT_BARE_MODULE_EXTENSION: &str = ".js";

/// Complete loader configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoaderConfig {
    /// Directory the canonical paths are rooted in.
    pub asset_root: Option<String>,
    /// Path imported when none is given on the command line.
    pub entry: Option<String>,
    /// Directory bare specifiers are mapped into.
    pub bare_module_dir: Option<String>,
    /// Extension appended to mapped bare specifiers.
    pub bare_module_extension: Option<String>,
    /// Paths whose snapshot is their flattened default export.
    pub flatten_default: Vec<String>,
    /// Path prefixes whose snapshot is their flattened default export.
    pub flatten_default_prefix: Vec<String>,
    /// Values exposed to modules as loader globals.
    pub globals: BTreeMap<String, Value>,
}

#[derive(Clone, Copy, PartialEq)]
enum ArrayKey {
    FlattenDefault,
    FlattenDefaultPrefix,
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file.
    ///
    /// Expected format:
    /// ```toml
    /// [loader]
    /// asset_root = "extension"
    /// entry = "/dist/contentScripts/index.module.js"
    /// bare_module_dir = "/dist/contentScripts/modules"
    ///
    /// [interop]
    /// flatten_default = [
    ///     "/dist/contentScripts/modules/react.js",
    /// ]
    ///
    /// [globals]
    /// NODE_ENV = "development"
    /// __DEV__ = true
    /// ```
    pub fn load(path: &Path) -> Result<Self, LoaderError> {
        let content = fs::read_to_string(path).map_err(|e| {
            LoaderError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// Only the subset shown in [`LoaderConfig::load`] is understood: string
    /// keys, inline or multi-line string arrays, and scalar globals.
    pub fn parse(content: &str) -> Result<Self, LoaderError> {
        let mut config = LoaderConfig::new();
        let mut current_section = String::new();
        let mut open_array: Option<ArrayKey> = None;

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = strip_comment(raw).trim();

            if line.is_empty() {
                continue;
            }

            if let Some(key) = open_array {
                let (items, closed) = match line.find(']') {
                    Some(end) => (&line[..end], true),
                    None => (line, false),
                };
                for item in split_items(items) {
                    config.array_mut(key).push(parse_string(item, line_no)?);
                }
                if closed {
                    open_array = None;
                }
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            let (key, value) = split_key_value(line, line_no)?;

            match current_section.as_str() {
                "loader" => {
                    let value = parse_string(value, line_no)?;
                    match key {
                        "asset_root" => config.asset_root = Some(value),
                        "entry" => config.entry = Some(value),
                        "bare_module_dir" => config.bare_module_dir = Some(value),
                        "bare_module_extension" => config.bare_module_extension = Some(value),
                        _ => {
                            return Err(LoaderError::Config(format!(
                                "line {}: unknown loader key {}",
                                line_no, key
                            )))
                        }
                    }
                }
                "interop" => {
                    let array_key = match key {
                        "flatten_default" => ArrayKey::FlattenDefault,
                        "flatten_default_prefix" => ArrayKey::FlattenDefaultPrefix,
                        _ => {
                            return Err(LoaderError::Config(format!(
                                "line {}: unknown interop key {}",
                                line_no, key
                            )))
                        }
                    };
                    let body = value.strip_prefix('[').ok_or_else(|| {
                        LoaderError::Config(format!("line {}: expected an array", line_no))
                    })?;
                    let (items, closed) = match body.find(']') {
                        Some(end) => (&body[..end], true),
                        None => (body, false),
                    };
                    for item in split_items(items) {
                        config.array_mut(array_key).push(parse_string(item, line_no)?);
                    }
                    if !closed {
                        open_array = Some(array_key);
                    }
                }
                "globals" => {
                    config
                        .globals
                        .insert(key.to_string(), parse_scalar(value, line_no)?);
                }
                other => {
                    return Err(LoaderError::Config(format!(
                        "line {}: unknown section [{}]",
                        line_no, other
                    )))
                }
            }
        }

        if open_array.is_some() {
            return Err(LoaderError::Config("unterminated array".to_string()));
        }

        Ok(config)
    }

    fn array_mut(&mut self, key: ArrayKey) -> &mut Vec<String> {
        match key {
            ArrayKey::FlattenDefault => &mut self.flatten_default,
            ArrayKey::FlattenDefaultPrefix => &mut self.flatten_default_prefix,
        }
    }

    pub fn interop_policy(&self) -> InteropPolicy {
        let mut policy = InteropPolicy::new();
        for path in &self.flatten_default {
            policy = policy.with_exact(path.clone());
        }
        for prefix in &self.flatten_default_prefix {
            policy = policy.with_prefix(prefix.clone());
        }
        policy
    }

    pub fn path_resolver(&self) -> PathResolver {
        match &self.bare_module_dir {
            Some(dir) => PathResolver::new().with_bare_modules(BareModules::new(
                dir.clone(),
                self.bare_module_extension
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BARE_MODULE_EXTENSION.to_string()),
            )),
            None => PathResolver::new(),
        }
    }
}

fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn split_key_value(line: &str, line_no: usize) -> Result<(&str, &str), LoaderError> {
    let mut parts = line.splitn(2, '=');
    match (parts.next(), parts.next()) {
        (Some(key), Some(value)) => Ok((key.trim().trim_matches('"'), value.trim())),
        _ => Err(LoaderError::Config(format!(
            "line {}: expected key = value",
            line_no
        ))),
    }
}

fn split_items(items: &str) -> impl Iterator<Item = &str> {
    items.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_string(value: &str, line_no: usize) -> Result<String, LoaderError> {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(value[1..value.len() - 1].to_string())
    } else {
        Err(LoaderError::Config(format!(
            "line {}: expected a quoted string, found {}",
            line_no, value
        )))
    }
}

fn parse_scalar(value: &str, line_no: usize) -> Result<Value, LoaderError> {
    match value {
        "true" => Ok(Value::Boolean(true)),
        "false" => Ok(Value::Boolean(false)),
        v if v.starts_with('"') => parse_string(v, line_no).map(Value::String),
        v => v.parse::<f64>().map(Value::Number).map_err(|_| {
            LoaderError::Config(format!("line {}: unsupported value {}", line_no, v))
        }),
    }
}
