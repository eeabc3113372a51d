//! OpenAPI Studio CLI
//!
//! Command-line interface for creating and editing OpenAPI project documents.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use openapi_studio::{
    export_to, import_file, lint_file, write_document, AuthKind, DocumentError, Edit,
    ExportOptions, ImportOptions, Kind, Method, NodePath, OperationDraft, OperationKey,
    ParameterList, ProjectDocument, SchemaNode, SchemaTarget, Severity, Status, BODY_NODE_NAME,
};

#[derive(Parser)]
#[command(name = "openapi-studio")]
#[command(about = "Create and edit OpenAPI 3.0 project documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty project document
    New {
        /// Project title
        title: String,

        /// Project version
        #[arg(long, default_value = "1.0.0")]
        api_version: String,

        /// Project description
        #[arg(long)]
        description: Option<String>,

        /// Directory to write the document into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Add an operation (replaces an existing one at the same path and method)
    Add {
        /// Project document
        doc: PathBuf,

        /// HTTP method (get, post, put, delete, patch, options, head)
        method: String,

        /// Path, starting with '/'
        path: String,

        /// Operation summary (default: "METHOD /path")
        #[arg(long)]
        summary: Option<String>,

        /// Authentication: none, api-key, bearer, basic, oauth2
        #[arg(long, default_value = "none")]
        auth: String,

        /// Query parameter as NAME or NAME:KIND (repeatable)
        #[arg(long = "query", value_name = "NAME[:KIND]")]
        queries: Vec<String>,

        /// Request body kind
        #[arg(long, value_name = "KIND")]
        body: Option<String>,
    },

    /// Move an operation to another path and/or method
    Move {
        doc: PathBuf,
        method: String,
        path: String,
        new_method: String,
        new_path: String,
    },

    /// Remove an operation
    Remove {
        doc: PathBuf,
        method: String,
        path: String,
    },

    /// List operations
    List { doc: PathBuf },

    /// Edit the schema of a query parameter or the request body
    Schema {
        doc: PathBuf,
        method: String,
        path: String,

        /// Edit the query parameter with this name
        #[arg(long, conflicts_with = "body", required_unless_present = "body")]
        param: Option<String>,

        /// Edit the request body
        #[arg(long, conflicts_with = "param")]
        body: bool,

        #[command(subcommand)]
        action: SchemaAction,
    },

    /// Lint a project document
    Lint {
        doc: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Re-export a project document under its derived file name
    Export {
        doc: PathBuf,

        /// Output directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
}

#[derive(Subcommand)]
enum SchemaAction {
    /// Add a child to the container at NODE
    Add {
        node: String,
        /// Child name (default: generated)
        #[arg(long)]
        name: Option<String>,
    },
    /// Rename a child of NODE
    Rename { node: String, from: String, to: String },
    /// Remove a child of NODE
    Remove { node: String, name: String },
    /// Change the kind of NODE
    Retype { node: String, kind: String },
    /// Change the element kind of the array at NODE
    Element { node: String, kind: String },
    /// Set whether NODE is required
    Require {
        node: String,
        #[arg(action = clap::ArgAction::Set)]
        required: bool,
    },
    /// Set or clear the description of NODE
    Describe { node: String, text: Option<String> },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::New {
            title,
            api_version,
            description,
            dir,
        } => run_new(&title, &api_version, description.as_deref(), &dir),

        Commands::Add {
            doc,
            method,
            path,
            summary,
            auth,
            queries,
            body,
        } => run_add(&doc, &method, &path, summary, &auth, &queries, body.as_deref()),

        Commands::Move {
            doc,
            method,
            path,
            new_method,
            new_path,
        } => run_move(&doc, &method, &path, &new_method, &new_path),

        Commands::Remove { doc, method, path } => run_remove(&doc, &method, &path),

        Commands::List { doc } => run_list(&doc),

        Commands::Schema {
            doc,
            method,
            path,
            param,
            body: _,
            action,
        } => run_schema(&doc, &method, &path, param.as_deref(), action),

        Commands::Lint {
            doc,
            format,
            strict,
        } => run_lint(&doc, &format, strict),

        Commands::Export { doc, dir, compact } => run_export(&doc, &dir, compact),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Report an error and return its exit code.
fn fail(message: impl Display, code: i32) -> u8 {
    eprintln!("Error: {}", message);
    code as u8
}

fn document_error(e: DocumentError) -> u8 {
    let code = e.exit_code();
    fail(e, code)
}

fn load(doc: &Path) -> Result<ProjectDocument, u8> {
    import_file(doc, &ImportOptions::new()).map_err(|e| {
        let code = e.exit_code();
        fail(e, code)
    })
}

fn save(doc: &ProjectDocument, path: &Path) -> Result<(), u8> {
    write_document(doc, path, &ExportOptions::new()).map_err(|e| {
        let code = e.exit_code();
        fail(e, code)
    })
}

fn run_new(title: &str, version: &str, description: Option<&str>, dir: &Path) -> Result<(), u8> {
    let doc = ProjectDocument::new(title, version, description).map_err(document_error)?;
    let path = export_to(&doc, dir, &ExportOptions::new()).map_err(|e| {
        let code = e.exit_code();
        fail(e, code)
    })?;
    println!("{}", path.display());
    Ok(())
}

fn run_add(
    doc_path: &Path,
    method: &str,
    path: &str,
    summary: Option<String>,
    auth: &str,
    queries: &[String],
    body: Option<&str>,
) -> Result<(), u8> {
    let key = OperationKey::parse(method, path).map_err(document_error)?;
    let auth = auth.parse::<AuthKind>().map_err(document_error)?;

    let mut params = ParameterList::new();
    for query in queries {
        params.push(parse_query(query).map_err(document_error)?);
    }

    let mut draft = OperationDraft::new(key.method, key.path)
        .auth(auth)
        .parameters(params);
    if let Some(summary) = summary {
        draft = draft.summary(summary);
    }
    if let Some(kind) = body {
        let kind = kind.parse::<Kind>().map_err(document_error)?;
        draft = draft.body(SchemaNode::new(BODY_NODE_NAME, kind));
    }

    let mut doc = load(doc_path)?;
    let key = doc.create_operation(draft).map_err(document_error)?;
    save(&doc, doc_path)?;
    println!("Added {}", key);
    Ok(())
}

/// Parse `NAME` or `NAME:KIND` into a parameter node.
fn parse_query(query: &str) -> Result<SchemaNode, DocumentError> {
    let (name, kind) = match query.split_once(':') {
        Some((name, kind)) => (name, kind.parse::<Kind>()?),
        None => (query, Kind::String),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(DocumentError::EmptyParameterName);
    }
    Ok(SchemaNode::new(name, kind))
}

fn run_move(doc_path: &Path, method: &str, path: &str, new_method: &str, new_path: &str) -> Result<(), u8> {
    let from = OperationKey::parse(method, path).map_err(document_error)?;
    let new_method = new_method.parse::<Method>().map_err(document_error)?;

    let mut doc = load(doc_path)?;
    let Some(op) = doc.operation(&from) else {
        return Err(document_error(not_found(&from)));
    };
    let mut draft = OperationDraft::from_operation(&from, op);
    draft.method = new_method;
    draft.path = new_path.to_string();

    let key = doc.update_operation(&from, draft).map_err(document_error)?;
    save(&doc, doc_path)?;
    println!("Moved {} to {}", from, key);
    Ok(())
}

fn run_remove(doc_path: &Path, method: &str, path: &str) -> Result<(), u8> {
    let key = OperationKey::parse(method, path).map_err(document_error)?;
    let mut doc = load(doc_path)?;
    if doc.delete_operation(&key).is_none() {
        return Err(document_error(not_found(&key)));
    }
    save(&doc, doc_path)?;
    println!("Removed {}", key);
    Ok(())
}

fn not_found(key: &OperationKey) -> DocumentError {
    DocumentError::OperationNotFound {
        method: key.method.to_string(),
        path: key.path.clone(),
    }
}

fn run_list(doc_path: &Path) -> Result<(), u8> {
    let doc = load(doc_path)?;
    println!("{} {}", doc.info.title, doc.info.version);
    for (key, op) in doc.operations() {
        let mut line = format!("  {:<7} {}", key.method.display_name(), key.path);
        if op.auth != AuthKind::None {
            line.push_str(&format!(" [{}]", op.auth));
        }
        if let Some(summary) = &op.summary {
            line.push_str(&format!(" - {}", summary));
        }
        println!("{}", line);
    }
    Ok(())
}

fn run_schema(
    doc_path: &Path,
    method: &str,
    path: &str,
    param: Option<&str>,
    action: SchemaAction,
) -> Result<(), u8> {
    let key = OperationKey::parse(method, path).map_err(document_error)?;
    let mut doc = load(doc_path)?;
    let Some(op) = doc.operation(&key) else {
        return Err(document_error(not_found(&key)));
    };

    let target = match param {
        Some(name) => match op.parameters.iter().position(|p| p.name == name) {
            Some(index) => SchemaTarget::Parameter(index),
            None => {
                return Err(fail(
                    format!("{} has no query parameter '{}'", key, name),
                    2,
                ))
            }
        },
        None if op.body.is_some() => SchemaTarget::Body,
        None => return Err(fail(format!("{} has no request body", key), 2)),
    };

    let (node, edit) = schema_edit(action).map_err(|message| fail(message, 2))?;
    let node: NodePath = node.parse().map_err(|e| fail(e, 2))?;

    let changed = doc
        .edit_operation_schema(&key, target, &node, &edit)
        .map_err(|e| {
            let code = e.exit_code();
            fail(e, code)
        })?;
    if changed {
        save(&doc, doc_path)?;
        println!("Updated {} at {}", key, node);
    } else {
        println!("No change");
    }
    Ok(())
}

/// Split an action into its node path and edit.
fn schema_edit(action: SchemaAction) -> Result<(String, Edit), DocumentError> {
    Ok(match action {
        SchemaAction::Add { node, name } => (node, Edit::AddChild { name }),
        SchemaAction::Rename { node, from, to } => (node, Edit::RenameChild { from, to }),
        SchemaAction::Remove { node, name } => (node, Edit::DeleteChild { name }),
        SchemaAction::Retype { node, kind } => (node, Edit::SetKind(kind.parse()?)),
        SchemaAction::Element { node, kind } => (node, Edit::SetElementKind(kind.parse()?)),
        SchemaAction::Require { node, required } => (node, Edit::SetRequired(required)),
        SchemaAction::Describe { node, text } => (node, Edit::SetDescription(text)),
    })
}

fn run_lint(doc: &Path, format: &str, strict: bool) -> Result<(), u8> {
    if !doc.exists() {
        eprintln!("Error: path not found: {}", doc.display());
        return Err(2);
    }

    let result = lint_file(doc);

    if format == "json" {
        let output = serde_json::to_string_pretty(&result).map_err(|e| fail(e, 2))?;
        println!("{}", output);
    } else {
        let status_icon = match result.status {
            Status::Ok => "\x1b[32m✓\x1b[0m",
            Status::Warning => "\x1b[33m⚠\x1b[0m",
            Status::Error => "\x1b[31m✗\x1b[0m",
        };
        println!("  {} {}", status_icon, doc.display());

        for diag in &result.diagnostics {
            let (color, label) = match diag.severity {
                Severity::Error => ("\x1b[31m", "error"),
                Severity::Warning => ("\x1b[33m", "warning"),
            };
            println!(
                "    {}{}[{}]\x1b[0m: {} - {}",
                color, label, diag.code, diag.path, diag.message
            );
        }

        println!();
        if result.passed(strict) {
            println!("\x1b[32m✓ passed ({} warnings)\x1b[0m", result.warnings);
        } else {
            println!(
                "\x1b[31m✗ failed ({} errors, {} warnings)\x1b[0m",
                result.errors, result.warnings
            );
        }
    }

    if result.passed(strict) {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_export(doc_path: &Path, dir: &Path, compact: bool) -> Result<(), u8> {
    let doc = load(doc_path)?;
    let options = ExportOptions::new().compact(compact);
    let path = export_to(&doc, dir, &options).map_err(|e| {
        let code = e.exit_code();
        fail(e, code)
    })?;
    println!("{}", path.display());
    Ok(())
}
