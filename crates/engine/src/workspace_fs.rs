// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-task working directory layout: `main.tf`, `variables.tf`,
//! `terraform.tfvars.tmpl`, `terraform.tfvars`, under `<root>/<task_name>/`.

use std::path::Path;

use cts_core::{DriverError, Task};

#[cfg(unix)]
const DIR_MODE: u32 = 0o750;
#[cfg(unix)]
const FILE_MODE: u32 = 0o640;

async fn create_dir(path: &Path) -> Result<(), DriverError> {
    tokio::fs::create_dir_all(path).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(DIR_MODE);
        tokio::fs::set_permissions(path, perms).await?;
    }
    Ok(())
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), DriverError> {
    tokio::fs::write(path, contents).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(FILE_MODE);
        tokio::fs::set_permissions(path, perms).await?;
    }
    Ok(())
}

fn render_main_tf(task: &Task) -> String {
    let mut out = format!("module \"task\" {{\n  source = \"{}\"\n", task.module_reference);
    for provider in &task.providers {
        out.push_str(&format!("  # provider: {provider}\n"));
    }
    out.push_str("}\n");
    out
}

fn render_variables_tf(task: &Task) -> String {
    let mut out = String::new();
    for key in task.variables.keys() {
        out.push_str(&format!("variable \"{key}\" {{}}\n"));
    }
    out
}

fn render_tfvars_tmpl(task: &Task) -> String {
    let mut out = String::new();
    for (i, _) in task.module_inputs.iter().enumerate() {
        out.push_str(&format!("dep_{i} = ${{dep_{i}}}\n"));
    }
    out
}

/// Emit `main.tf`/`variables.tf`/`terraform.tfvars.tmpl` from the task
/// definition. Called on every `InitTask`, which re-creates the working
/// directory if missing and always re-writes the template source file.
pub async fn init_workspace(task: &Task) -> Result<(), DriverError> {
    create_dir(&task.working_dir).await?;
    write_file(&task.working_dir.join("main.tf"), render_main_tf(task).as_bytes()).await?;
    write_file(&task.working_dir.join("variables.tf"), render_variables_tf(task).as_bytes())
        .await?;
    write_file(
        &task.working_dir.join("terraform.tfvars.tmpl"),
        render_tfvars_tmpl(task).as_bytes(),
    )
    .await?;
    Ok(())
}

/// Re-create the rendered artifact. Called on every successful
/// `RenderTemplate`.
pub async fn write_rendered_tfvars(working_dir: &Path, rendered: &[u8]) -> Result<(), DriverError> {
    write_file(&working_dir.join("terraform.tfvars"), rendered).await
}

/// Read back the template source written by `init_workspace`, so
/// `RenderTemplate` interpolates the same `${dep_i}` directives it emitted.
pub async fn read_tfvars_tmpl(working_dir: &Path) -> Result<String, DriverError> {
    let bytes = tokio::fs::read(working_dir.join("terraform.tfvars.tmpl")).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
#[path = "workspace_fs_tests.rs"]
mod tests;
