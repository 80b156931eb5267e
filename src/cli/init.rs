use std::env;
use std::path::Path;

use serde_json::json;

use super::{echo_root_notice, finish, print_json, warn_config};
use crate::cli::commands::InitArgs;
use crate::error::TaskError;
use crate::store::config::{self, ConfigWrite, ListColumn, Settings};
use crate::store::{choose_root, default_init_root, ensure_layout, TasksRoot};

pub fn run(args: InitArgs, json_output: bool, root_flag: Option<&Path>) -> i32 {
    finish(run_inner(args, json_output, root_flag), json_output)
}

fn resolve_init_root(root_flag: Option<&Path>) -> Result<TasksRoot, TaskError> {
    if let Some(path) = root_flag {
        return Ok(TasksRoot::new(path));
    }
    let cwd = env::current_dir()?;
    match choose_root(&cwd) {
        (Some(root), multiple) => {
            echo_root_notice(&root, multiple);
            Ok(root)
        }
        (None, _) => {
            let root = default_init_root(&cwd);
            eprintln!("No .tasks found. Initializing at: {}", root.path().display());
            Ok(root)
        }
    }
}

fn requested_columns(names: &[String]) -> Result<Vec<ListColumn>, TaskError> {
    names
        .iter()
        .map(|name| {
            let name = name.trim();
            ListColumn::default_width(name)
                .map(|width| ListColumn {
                    name: name.to_string(),
                    width,
                })
                .ok_or_else(|| TaskError::validation(format!("Unsupported list column: {name}")))
        })
        .collect()
}

fn run_inner(args: InitArgs, json_output: bool, root_flag: Option<&Path>) -> Result<i32, TaskError> {
    let root = resolve_init_root(root_flag)?;
    ensure_layout(&root)?;
    let cfg_path = root.config_path();

    let wants_settings =
        args.interactive_enabled.is_some() || args.show_banner.is_some() || !args.columns.is_empty();

    let (outcome, settings) = if wants_settings {
        let mut settings = config::resolve_settings(&root, &warn_config);
        if let Some(enabled) = args.interactive_enabled {
            settings.interactive_enabled = enabled;
        }
        if let Some(show) = args.show_banner {
            settings.show_banner = show;
        }
        if !args.columns.is_empty() {
            settings.list_columns = requested_columns(&args.columns)?;
        }
        let outcome = config::upsert_init_config(&root, &settings, &warn_config)?;
        (Some(outcome), settings)
    } else {
        let written = config::write_default_config_if_missing(&root)?;
        let settings = config::resolve_settings(&root, &warn_config);
        (written.then_some(ConfigWrite::Created), settings)
    };

    if json_output {
        print_json(&crate::output::json::success(json!({
            "path": root.path().to_string_lossy(),
            "config": cfg_path.to_string_lossy(),
            "config_status": outcome.map(|o| o.as_str()).unwrap_or("existing"),
            "interactive_enabled": settings.interactive_enabled,
            "show_banner": settings.show_banner
        })));
    } else {
        println!("Initialized tasks root: {}", root.path().display());
        match outcome {
            None => println!("Using existing config: {}", cfg_path.display()),
            Some(outcome) => println!(
                "{} config: {} (interactive_enabled={}, show_banner={})",
                match outcome {
                    ConfigWrite::Created => "Created",
                    ConfigWrite::Updated => "Updated",
                },
                cfg_path.display(),
                settings.interactive_enabled,
                settings.show_banner
            ),
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_columns_take_default_widths() {
        let columns = requested_columns(&["status".into(), " deps ".into()]).unwrap();
        assert_eq!(
            columns,
            vec![
                ListColumn { name: "status".into(), width: 10 },
                ListColumn { name: "deps".into(), width: 12 },
            ]
        );
        assert!(requested_columns(&["colour".into()]).is_err());
    }
}
