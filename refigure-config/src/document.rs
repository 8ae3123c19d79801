//! Parsed configuration documents

use crate::error::{ConfigError, ConfigResult};
use crate::fs::FileSystem;
use crate::lookup::{self, AnywhereMatch, EntryQuery};
use crate::options::EntryFormat;
use crate::scope::ScopePath;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use xmltree::{Element, EmitterConfig, XMLNode};

/// One parsed document with its origin
#[derive(Debug, Clone)]
pub struct ConfigurationSource {
    path: PathBuf,
    is_local: bool,
    root: Element,
}

/// How a write changed the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// An existing entry's value was replaced
    Updated,
    /// A new entry was added
    Appended,
}

impl ConfigurationSource {
    /// Read and parse a document through the filesystem collaborator
    pub fn load(fs: &dyn FileSystem, path: &Path, is_local: bool) -> ConfigResult<Self> {
        debug!(path = %path.display(), is_local, "Loading config file");
        let content = fs.read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::ConfigFileNotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::load_failure(path, e),
        })?;
        Self::parse(path, &content, is_local)
    }

    /// Parse document text that originated at `path`
    pub fn parse(path: impl Into<PathBuf>, content: &str, is_local: bool) -> ConfigResult<Self> {
        let path = path.into();
        let root = Element::parse(content.as_bytes())
            .map_err(|e| ConfigError::load_failure(&path, e))?;
        Ok(Self {
            path,
            is_local,
            root,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Value of the first entry under the query's scope
    pub fn find_scoped(&self, query: &EntryQuery) -> Option<&str> {
        lookup::find_scoped(&self.root, query)
    }

    /// Every value keyed `key`, ignoring scope
    pub fn find_anywhere(&self, key: &str, format: &EntryFormat) -> AnywhereMatch {
        lookup::find_anywhere(&self.root, key, format)
    }

    /// Set the value of the first element keyed `key` anywhere in the document,
    /// appending a new entry under `fallback_scope` when there is none
    pub(crate) fn upsert_anywhere(
        &mut self,
        key: &str,
        value: &str,
        format: &EntryFormat,
        fallback_scope: &ScopePath,
    ) -> ConfigResult<WriteOutcome> {
        match lookup::locate_anywhere(&self.root, key, format) {
            Some(node_path) => {
                self.set_value_at(&node_path, value, format)?;
                Ok(WriteOutcome::Updated)
            }
            None => {
                self.append_entry(fallback_scope, key, value, format)?;
                Ok(WriteOutcome::Appended)
            }
        }
    }

    /// Set the value of the first entry matching `query`, appending one when absent
    pub(crate) fn upsert_scoped(
        &mut self,
        query: &EntryQuery,
        value: &str,
    ) -> ConfigResult<WriteOutcome> {
        match lookup::locate_scoped(&self.root, query) {
            Some(node_path) => {
                self.set_value_at(&node_path, value, &query.format)?;
                Ok(WriteOutcome::Updated)
            }
            None => {
                self.append_entry(&query.scope, &query.key, value, &query.format)?;
                Ok(WriteOutcome::Appended)
            }
        }
    }

    /// Serialize the document for persisting
    pub fn to_xml(&self) -> ConfigResult<String> {
        let mut buffer = Vec::new();
        let config = EmitterConfig::new().perform_indent(true);
        self.root
            .write_with_config(&mut buffer, config)
            .map_err(|e| ConfigError::write_failure(&self.path, e))?;
        String::from_utf8(buffer).map_err(|e| ConfigError::write_failure(&self.path, e))
    }

    fn set_value_at(
        &mut self,
        node_path: &[usize],
        value: &str,
        format: &EntryFormat,
    ) -> ConfigResult<()> {
        let element = lookup::element_at_mut(&mut self.root, node_path)
            .ok_or_else(|| ConfigError::write_failure(&self.path, "located entry vanished"))?;
        element
            .attributes
            .insert(format.value_attribute.clone(), value.to_string());
        Ok(())
    }

    fn append_entry(
        &mut self,
        scope: &ScopePath,
        key: &str,
        value: &str,
        format: &EntryFormat,
    ) -> ConfigResult<()> {
        if self.root.name != scope.root() {
            return Err(ConfigError::write_failure(
                &self.path,
                format!(
                    "root element <{}> does not match scope {}",
                    self.root.name, scope
                ),
            ));
        }

        // Reuse the first existing element of each scope segment, create the rest
        let mut node_path = Vec::new();
        for segment in &scope.segments()[1..] {
            let parent = self.scope_element_mut(&node_path)?;
            let position = parent.children.iter().position(
                |node| matches!(node, XMLNode::Element(child) if child.name == *segment),
            );
            let index = match position {
                Some(index) => index,
                None => {
                    parent.children.push(XMLNode::Element(Element::new(segment)));
                    parent.children.len() - 1
                }
            };
            node_path.push(index);
        }

        let mut entry = Element::new(&format.tag);
        entry
            .attributes
            .insert(format.key_attribute.clone(), key.to_string());
        entry
            .attributes
            .insert(format.value_attribute.clone(), value.to_string());
        self.scope_element_mut(&node_path)?
            .children
            .push(XMLNode::Element(entry));
        Ok(())
    }

    fn scope_element_mut(&mut self, node_path: &[usize]) -> ConfigResult<&mut Element> {
        let path = &self.path;
        lookup::element_at_mut(&mut self.root, node_path)
            .ok_or_else(|| ConfigError::write_failure(path, "scope element vanished"))
    }
}
