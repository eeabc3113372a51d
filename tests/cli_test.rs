//! CLI integration tests for openapi-studio binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("openapi-studio"))
}

// Helper to create a project document in a temp dir
fn new_project(dir: &TempDir) -> PathBuf {
    cmd()
        .args(["new", "Pet Store", "--dir", dir.path().to_str().unwrap()])
        .assert()
        .success();
    dir.path().join("pet-store-openapi.json")
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

mod new_command {
    use super::*;

    #[test]
    fn writes_empty_document() {
        let dir = TempDir::new().unwrap();
        cmd()
            .args([
                "new",
                "Pet Store",
                "--api-version",
                "2.0.0",
                "--description",
                "All the pets",
                "--dir",
                dir.path().to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("pet-store-openapi.json"));

        let doc = read_json(&dir.path().join("pet-store-openapi.json"));
        assert_eq!(doc["openapi"], "3.0.0");
        assert_eq!(doc["info"]["title"], "Pet Store");
        assert_eq!(doc["info"]["version"], "2.0.0");
        assert_eq!(doc["info"]["description"], "All the pets");
        assert_eq!(doc["paths"], serde_json::json!({}));
    }

    #[test]
    fn blank_title_fails() {
        let dir = TempDir::new().unwrap();
        cmd()
            .args(["new", "  ", "--dir", dir.path().to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("title"));
    }
}

mod add_command {
    use super::*;

    #[test]
    fn adds_operation_with_auth_and_params() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);

        cmd()
            .args([
                "add",
                doc_path.to_str().unwrap(),
                "get",
                "/users",
                "--auth",
                "bearer",
                "--query",
                "limit:integer",
                "--query",
                "q",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Added GET /users"));

        let doc = read_json(&doc_path);
        let op = &doc["paths"]["/users"]["get"];
        assert_eq!(op["summary"], "GET /users");
        assert_eq!(op["security"], serde_json::json!([{ "bearer": [] }]));
        assert_eq!(op["parameters"][0]["name"], "limit");
        assert_eq!(op["parameters"][0]["in"], "query");
        assert_eq!(op["parameters"][0]["schema"]["type"], "integer");
        assert_eq!(op["parameters"][1]["schema"]["type"], "string");
        assert_eq!(op["responses"]["200"]["description"], "Successful response");
        assert_eq!(
            doc["components"]["securitySchemes"]["bearer"],
            serde_json::json!({ "type": "http", "scheme": "bearer" })
        );
    }

    #[test]
    fn adds_body() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);

        cmd()
            .args(["add", doc_path.to_str().unwrap(), "POST", "/pets", "--body", "object"])
            .assert()
            .success();

        let doc = read_json(&doc_path);
        let schema = &doc["paths"]["/pets"]["post"]["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn rejects_path_without_slash() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);

        cmd()
            .args(["add", doc_path.to_str().unwrap(), "get", "users"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("must start with '/'"));
    }

    #[test]
    fn rejects_blank_query_name() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);

        for query in ["--query=:integer", "--query=  "] {
            cmd()
                .args(["add", doc_path.to_str().unwrap(), "get", "/x", query])
                .assert()
                .code(2)
                .stderr(predicate::str::contains("query parameter name must not be empty"));
        }

        let doc = read_json(&doc_path);
        assert!(doc["paths"].get("/x").is_none());
    }

    #[test]
    fn rejects_unknown_method() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);

        cmd()
            .args(["add", doc_path.to_str().unwrap(), "fetch", "/users"])
            .assert()
            .code(2);
    }

    #[test]
    fn missing_document_is_io_error() {
        cmd()
            .args(["add", "/nonexistent/api.json", "get", "/users"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }
}

mod move_and_remove {
    use super::*;

    #[test]
    fn move_relocates_and_prunes_path() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);
        let doc_arg = doc_path.to_str().unwrap();

        cmd()
            .args(["add", doc_arg, "get", "/users", "--auth", "api-key", "--query", "id"])
            .assert()
            .success();
        cmd()
            .args(["move", doc_arg, "get", "/users", "post", "/users/{id}"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Moved GET /users to POST /users/{id}"));

        let doc = read_json(&doc_path);
        assert!(doc["paths"].get("/users").is_none());
        let op = &doc["paths"]["/users/{id}"]["post"];
        assert_eq!(op["summary"], "POST /users/{id}");
        assert_eq!(op["parameters"][0]["name"], "id");
        assert_eq!(op["security"][0]["api-key"], serde_json::json!([]));
    }

    #[test]
    fn move_missing_operation_fails() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);

        cmd()
            .args(["move", doc_path.to_str().unwrap(), "get", "/nope", "get", "/x"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no operation GET /nope"));
    }

    #[test]
    fn remove_keeps_other_methods() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);
        let doc_arg = doc_path.to_str().unwrap();

        cmd().args(["add", doc_arg, "get", "/pets"]).assert().success();
        cmd().args(["add", doc_arg, "post", "/pets"]).assert().success();
        cmd().args(["remove", doc_arg, "get", "/pets"]).assert().success();

        let doc = read_json(&doc_path);
        let item = doc["paths"]["/pets"].as_object().unwrap();
        assert_eq!(item.keys().collect::<Vec<_>>(), vec!["post"]);

        cmd().args(["remove", doc_arg, "post", "/pets"]).assert().success();
        let doc = read_json(&doc_path);
        assert_eq!(doc["paths"], serde_json::json!({}));
    }
}

mod list_command {
    use super::*;

    #[test]
    fn lists_sorted_operations() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);
        let doc_arg = doc_path.to_str().unwrap();

        cmd().args(["add", doc_arg, "post", "/users"]).assert().success();
        cmd()
            .args(["add", doc_arg, "get", "/pets", "--summary", "List pets", "--auth", "basic"])
            .assert()
            .success();

        let output = cmd().args(["list", doc_arg]).output().unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        let pets = stdout.find("/pets [basic] - List pets").unwrap();
        let users = stdout.find("/users - POST /users").unwrap();
        assert!(pets < users);
    }
}

mod schema_command {
    use super::*;

    fn body_project(dir: &TempDir) -> PathBuf {
        let doc_path = new_project(dir);
        cmd()
            .args(["add", doc_path.to_str().unwrap(), "post", "/orders", "--body", "object"])
            .assert()
            .success();
        doc_path
    }

    #[test]
    fn builds_nested_body() {
        let dir = TempDir::new().unwrap();
        let doc_path = body_project(&dir);
        let doc_arg = doc_path.to_str().unwrap();
        let schema = |action: &[&str]| {
            let mut args = vec!["schema", doc_arg, "post", "/orders", "--body"];
            args.extend_from_slice(action);
            cmd().args(args).assert().success();
        };

        schema(&["add", "/", "--name", "lines"]);
        schema(&["retype", "/properties/lines", "array"]);
        schema(&["element", "/properties/lines", "object"]);
        schema(&["add", "/properties/lines", "--name", "sku"]);
        schema(&["require", "/properties/lines/items/properties/sku", "true"]);
        schema(&["describe", "/properties/lines", "Order lines"]);

        let doc = read_json(&doc_path);
        let body = &doc["paths"]["/orders"]["post"]["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(
            body["properties"]["lines"],
            serde_json::json!({
                "type": "array",
                "description": "Order lines",
                "items": {
                    "type": "object",
                    "properties": { "sku": { "type": "string" } },
                    "required": ["sku"]
                }
            })
        );
    }

    #[test]
    fn rename_conflict_fails() {
        let dir = TempDir::new().unwrap();
        let doc_path = body_project(&dir);
        let doc_arg = doc_path.to_str().unwrap();

        for name in ["a", "b"] {
            cmd()
                .args(["schema", doc_arg, "post", "/orders", "--body", "add", "/", "--name", name])
                .assert()
                .success();
        }
        cmd()
            .args(["schema", doc_arg, "post", "/orders", "--body", "rename", "/", "a", "b"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn edits_parameter() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);
        let doc_arg = doc_path.to_str().unwrap();

        cmd()
            .args(["add", doc_arg, "get", "/search", "--query", "q"])
            .assert()
            .success();
        cmd()
            .args(["schema", doc_arg, "get", "/search", "--param", "q", "require", "/", "true"])
            .assert()
            .success();

        let doc = read_json(&doc_path);
        assert_eq!(doc["paths"]["/search"]["get"]["parameters"][0]["required"], true);
    }

    #[test]
    fn unknown_parameter_fails() {
        let dir = TempDir::new().unwrap();
        let doc_path = body_project(&dir);

        cmd()
            .args([
                "schema",
                doc_path.to_str().unwrap(),
                "post",
                "/orders",
                "--param",
                "missing",
                "add",
                "/",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no query parameter 'missing'"));
    }

    #[test]
    fn no_op_reports_no_change() {
        let dir = TempDir::new().unwrap();
        let doc_path = body_project(&dir);

        cmd()
            .args([
                "schema",
                doc_path.to_str().unwrap(),
                "post",
                "/orders",
                "--body",
                "retype",
                "/",
                "object",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("No change"));
    }
}

mod lint_command {
    use super::*;

    #[test]
    fn clean_document_passes() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);

        cmd()
            .args(["lint", doc_path.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("passed"));
    }

    #[test]
    fn warnings_fail_only_in_strict_mode() {
        let dir = TempDir::new().unwrap();
        let doc_path = new_project(&dir);
        let doc_arg = doc_path.to_str().unwrap();
        cmd()
            .args(["add", doc_arg, "post", "/pets", "--body", "object"])
            .assert()
            .success();

        cmd()
            .args(["lint", doc_arg])
            .assert()
            .success()
            .stdout(predicate::str::contains("W002"));
        cmd().args(["lint", doc_arg, "--strict"]).assert().code(1);
    }

    #[test]
    fn json_format_reports_errors() {
        let dir = TempDir::new().unwrap();
        let doc_path = write_temp_file(
            &dir,
            "broken.json",
            r#"{"openapi": "3.0.0", "info": {"title": "Broken"},
                "paths": {"/me": {"get": {"security": [{"bearer": []}]}}}}"#,
        );

        let output = cmd()
            .args(["lint", doc_path.to_str().unwrap(), "--format", "json"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));
        let result: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(result["status"], "error");
        assert_eq!(result["diagnostics"][0]["code"], "E002");
    }

    #[test]
    fn unreadable_document_reports_e001() {
        let dir = TempDir::new().unwrap();
        let doc_path = write_temp_file(&dir, "bad.json", "{ not json");

        cmd()
            .args(["lint", doc_path.to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("E001"));
    }

    #[test]
    fn missing_path_fails() {
        cmd()
            .args(["lint", "/nonexistent/api.json"])
            .assert()
            .code(2);
    }
}

mod export_command {
    use super::*;

    #[test]
    fn exports_under_derived_name() {
        let dir = TempDir::new().unwrap();
        let source = write_temp_file(
            &dir,
            "source.json",
            r#"{"openapi": "3.0.0", "info": {"title": "My  Cool API"}}"#,
        );
        let out = TempDir::new().unwrap();

        cmd()
            .args([
                "export",
                source.to_str().unwrap(),
                "--dir",
                out.path().to_str().unwrap(),
                "--compact",
            ])
            .assert()
            .success();

        let content = fs::read_to_string(out.path().join("my-cool-api-openapi.json")).unwrap();
        assert_eq!(content.trim_end().lines().count(), 1);
        let doc: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(doc["info"]["version"], "1.0.0");
    }

    #[test]
    fn rejects_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let source = write_temp_file(&dir, "api.txt", "{}");

        cmd()
            .args(["export", source.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unsupported file extension"));
    }
}
