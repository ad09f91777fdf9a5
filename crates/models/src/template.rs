use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::entity::EntityKind;

/// Which side of the publish a path is resolved for: the editable working
/// file or the published deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportKind {
    Working,
    Output,
}

/// Asset/shot legs of a template entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindTemplates {
    pub asset: String,
    pub shot: String,
}

impl KindTemplates {
    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Asset => &self.asset,
            EntityKind::Shot => &self.shot,
        }
    }
}

/// One export leg of the project file tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportTemplate {
    pub mountpoint: String,
    pub root: String,
    pub file_name: KindTemplates,
    pub folder_path: KindTemplates,
}

/// Per-project path-template document.
///
/// The remote service serves templates with `<Placeholder>` tokens; they are
/// normalized to `{Placeholder}` on ingest so the resolver only ever sees
/// brace tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathTemplate {
    pub working: ExportTemplate,
    pub output: ExportTemplate,
}

impl PathTemplate {
    /// Parses the raw document from the remote service and normalizes the
    /// placeholder brackets.
    pub fn from_document(document: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut template: PathTemplate = serde_json::from_value(document.clone())?;
        for export in [&mut template.working, &mut template.output] {
            normalize(&mut export.file_name.asset);
            normalize(&mut export.file_name.shot);
            normalize(&mut export.folder_path.asset);
            normalize(&mut export.folder_path.shot);
        }
        Ok(template)
    }

    pub fn export(&self, kind: ExportKind) -> &ExportTemplate {
        match kind {
            ExportKind::Working => &self.working,
            ExportKind::Output => &self.output,
        }
    }
}

fn normalize(template: &mut String) {
    if template.contains('<') {
        *template = template.replace('<', "{").replace('>', "}");
    }
}
