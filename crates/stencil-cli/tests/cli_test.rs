use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_render_with_set_values() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("readme.md.hbs");
    std::fs::write(&template, "# {{name}}\n{{#if private}}private{{/if}} {{upper name}}").unwrap();

    cargo_bin_cmd!("stencil")
        .current_dir(dir.path())
        .args([
            "render",
            template.to_str().unwrap(),
            "--set",
            "name=demo",
            "--set",
            "private=true",
        ])
        .assert()
        .success()
        .stdout("# demo\nprivate DEMO");
}

#[test]
fn test_render_from_context_file_to_output() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("page.tsx.hbs");
    std::fs::write(&template, "<h1>{{title}}</h1>{{unknown}}").unwrap();
    let context = dir.path().join("ctx.json");
    std::fs::write(&context, r#"{"title": "<b>Hi</b>"}"#).unwrap();
    let output = dir.path().join("page.tsx");

    cargo_bin_cmd!("stencil")
        .current_dir(dir.path())
        .args([
            "render",
            template.to_str().unwrap(),
            "--context",
            context.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "<h1><b>Hi</b></h1>{{unknown}}"
    );
}

#[test]
fn test_render_templated_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("component.tsx.hbs");
    std::fs::write(&template, "export const {{pascal name}} = () => null;").unwrap();
    let output = dir.path().join("{{kebab name}}.tsx");

    cargo_bin_cmd!("stencil")
        .current_dir(dir.path())
        .args([
            "render",
            template.to_str().unwrap(),
            "--set",
            "name=user card",
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(dir.path().join("user-card.tsx")).unwrap(),
        "export const UserCard = () => null;"
    );
}

#[test]
fn test_render_missing_template_fails() {
    let dir = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("stencil")
        .current_dir(dir.path())
        .args(["render", "missing.hbs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to render missing.hbs"));
}

#[test]
fn test_precompile_reports_cache() {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(templates.join("a.hbs"), "{{a}}").unwrap();
    std::fs::write(templates.join("b.hbs"), "{{#if}}").unwrap();
    std::fs::write(
        dir.path().join("stencil.yaml"),
        "name: demo\ntemplates:\n  max_cache_size: 5\n",
    )
    .unwrap();

    let output = cargo_bin_cmd!("stencil")
        .args(["--config", dir.path().to_str().unwrap(), "precompile"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(summary["compiled"], 1);
    assert_eq!(summary["skipped"].as_array().unwrap().len(), 1);
    assert_eq!(summary["cache"]["size"], 1);
    assert_eq!(summary["cache"]["max_size"], 5);
}

#[test]
fn test_transform_dry_run_then_write() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("button.tsx");
    let source = "export const Button = ({ className }: Props) => <button className={cn(className, 'px-4')} />;\n";
    std::fs::write(&file, source).unwrap();

    cargo_bin_cmd!("stencil")
        .current_dir(dir.path())
        .args(["transform", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Reordered cn() arguments at line 1: className arguments moved last",
        ))
        .stdout(predicate::str::contains("1 of 1 file(s) would change"));
    assert_eq!(std::fs::read_to_string(&file).unwrap(), source);

    cargo_bin_cmd!("stencil")
        .current_dir(dir.path())
        .args(["transform", "--write", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 file(s) updated"));
    assert_eq!(
        std::fs::read_to_string(&file).unwrap(),
        "export const Button = ({ className }: Props) => <button className={cn('px-4', className)} />;\n"
    );
}

#[test]
fn test_transform_custom_target_fn() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("card.tsx");
    std::fs::write(&file, "clsx(className, 'p-2');\n").unwrap();

    cargo_bin_cmd!("stencil")
        .current_dir(dir.path())
        .args(["transform", "--write", "--target-fn", "clsx", file.to_str().unwrap()])
        .assert()
        .success();
    assert_eq!(
        std::fs::read_to_string(&file).unwrap(),
        "clsx('p-2', className);\n"
    );
}

#[test]
fn test_fmt_templates() {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(templates.join("a.ts.hbs"), "const a = 1; const b = 2;").unwrap();

    cargo_bin_cmd!("stencil")
        .current_dir(dir.path())
        .args(["fmt-templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed 1 template(s)"));
    assert_eq!(
        std::fs::read_to_string(templates.join("a.ts.hbs")).unwrap(),
        "const a = 1;\nconst b = 2;"
    );
}
