//! `config.toml` next to the executable.
//!
//! The file is parsed twice: once strictly through serde to validate the
//! `[models]` section, and once into a `toml_edit` document that is the
//! copy written back, so sections and comments this tool does not know
//! about survive a save untouched.

use std::{
    fmt,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::Deserialize;
use tempfile::NamedTempFile;
use toml_edit::{DocumentMut, Value};

use crate::error::{Error, Result};

pub const CONFIG_FILENAME: &str = "config.toml";
const MODELS_SECTION: &str = "models";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    All,
    Group1,
    Group2,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::All, Group::Group1, Group::Group2];

    pub fn key(self) -> &'static str {
        match self {
            Group::All => "all",
            Group::Group1 => "group_1",
            Group::Group2 => "group_2",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    models: ModelGroups,
}

/// The recognized groups of the `[models]` section. Absent groups stay
/// `None` and are never created on save.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelGroups {
    pub all: Option<Vec<String>>,
    pub group_1: Option<Vec<String>>,
    pub group_2: Option<Vec<String>>,
}

impl ModelGroups {
    pub fn get(&self, group: Group) -> &[String] {
        let models = match group {
            Group::All => &self.all,
            Group::Group1 => &self.group_1,
            Group::Group2 => &self.group_2,
        };
        models.as_deref().unwrap_or(&[])
    }

    fn get_mut(&mut self, group: Group) -> Option<&mut Vec<String>> {
        match group {
            Group::All => self.all.as_mut(),
            Group::Group1 => self.group_1.as_mut(),
            Group::Group2 => self.group_2.as_mut(),
        }
    }
}

/// Old model id to its replacement, in the order the replacements were chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    entries: Vec<(String, String)>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `old` to `new`, overwriting an earlier binding for `old`.
    pub fn insert<O: Into<String>, N: Into<String>>(&mut self, old: O, new: N) {
        let (old, new) = (old.into(), new.into());
        match self.entries.iter_mut().find(|(o, _)| *o == old) {
            Some(entry) => entry.1 = new,
            None => self.entries.push((old, new)),
        }
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(o, _)| o == old)
            .map(|(_, n)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(o, n)| (o.as_str(), n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ConfigDocument {
    groups: ModelGroups,
    document: DocumentMut,
}

impl ConfigDocument {
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let document = text
            .parse::<DocumentMut>()
            .map_err(|e| Error::config(path, "invalid TOML", e))?;
        let file: ConfigFile = toml::from_str(text)
            .map_err(|e| Error::config(path, "invalid [models] section", e))?;

        Ok(Self {
            groups: file.models,
            document,
        })
    }

    pub fn groups(&self) -> &ModelGroups {
        &self.groups
    }

    pub fn group(&self, group: Group) -> &[String] {
        self.groups.get(group)
    }

    /// Rewrites every slot holding a replaced id in each recognized group.
    /// Order and length of every group are kept. Returns the number of
    /// slots rewritten.
    pub fn apply_replacements(&mut self, replacements: &ReplacementMap) -> usize {
        if replacements.is_empty() {
            return 0;
        }

        let mut rewritten = 0;
        for group in Group::ALL {
            let Some(models) = self.groups.get_mut(group) else {
                continue;
            };
            for model in models.iter_mut() {
                if let Some(new) = replacements.get(model) {
                    debug!("  {group}: {model} -> {new}");
                    *model = new.to_string();
                    rewritten += 1;
                }
            }
            self.rewrite_array(group, replacements);
        }
        rewritten
    }

    fn rewrite_array(&mut self, group: Group, replacements: &ReplacementMap) {
        let Some(array) = self
            .document
            .get_mut(MODELS_SECTION)
            .and_then(|item| item.as_table_like_mut())
            .and_then(|table| table.get_mut(group.key()))
            .and_then(|item| item.as_array_mut())
        else {
            return;
        };

        for value in array.iter_mut() {
            let Some(new) = value.as_str().and_then(|old| replacements.get(old)) else {
                continue;
            };
            let decor = value.decor().clone();
            *value = Value::from(new);
            *value.decor_mut() = decor;
        }
    }

    /// The full document as it will be written.
    pub fn to_toml_string(&self) -> String {
        self.document.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// `config.toml` in the directory holding the running executable.
    pub fn beside_executable() -> Result<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| Error::config(CONFIG_FILENAME, "cannot locate executable", e))?;
        let dir = exe.parent().ok_or_else(|| {
            Error::config_msg(&exe, "executable has no parent directory")
        })?;
        Ok(Self::new(dir.join(CONFIG_FILENAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ConfigDocument> {
        debug!("ConfigStore::load: {:?}", self.path);
        let text = fs::read_to_string(&self.path)
            .map_err(|e| Error::config(&self.path, "cannot read file", e))?;
        ConfigDocument::parse(&self.path, &text)
    }

    /// Writes the whole document through a temporary file in the same
    /// directory, then renames it over the config. An existing file's
    /// permissions carry over to the new one.
    pub fn save(&self, config: &ConfigDocument) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let write_err = |e| Error::config(&self.path, "cannot write file", e);

        let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
        temp.write_all(config.to_toml_string().as_bytes())
            .map_err(write_err)?;
        if let Ok(meta) = fs::metadata(&self.path) {
            temp.as_file()
                .set_permissions(meta.permissions())
                .map_err(write_err)?;
        }
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.path)
            .map_err(|e| Error::config(&self.path, "cannot replace file", e))?;

        info!("Saved {:?}", self.path);
        Ok(())
    }
}
