use std::path::Path;

use super::{finish, open_service, print_json, warn_config};
use crate::cli::commands::{ListArgs, TagsArgs};
use crate::error::TaskError;
use crate::models::TaskStatus;
use crate::output;
use crate::service::{ListFilter, TagSort};
use crate::store::config;

fn parse_status(raw: Option<&str>) -> Result<Option<TaskStatus>, TaskError> {
    raw.map(TaskStatus::from_filter).transpose()
}

pub fn run_list(args: ListArgs, json_output: bool, root_flag: Option<&Path>) -> i32 {
    finish(list_inner(args, json_output, root_flag), json_output)
}

fn list_inner(args: ListArgs, json_output: bool, root_flag: Option<&Path>) -> Result<i32, TaskError> {
    let svc = open_service(root_flag)?;
    let filter = ListFilter {
        status: parse_status(args.status.as_deref())?,
        include_trash: false,
        tags: args.tags,
        exclude_tags: args.exclude_tags,
        require_all_tags: args.all_tags,
        untagged_only: args.untagged,
    };
    let tasks = svc.list_tasks(&filter)?;
    let unmet = svc.unmet_counts()?;

    if json_output {
        print_json(&output::json::success(output::json::task_list(&tasks, &unmet)));
    } else {
        let settings = config::resolve_settings(svc.root(), &warn_config);
        println!(
            "{}",
            output::text::render_task_list(&tasks, &unmet, &settings.list_columns)
        );
    }
    Ok(0)
}

pub fn run_tags(args: TagsArgs, json_output: bool, root_flag: Option<&Path>) -> i32 {
    finish(tags_inner(args, json_output, root_flag), json_output)
}

fn tags_inner(args: TagsArgs, json_output: bool, root_flag: Option<&Path>) -> Result<i32, TaskError> {
    let sort = TagSort::from_str(&args.sort).ok_or_else(|| {
        TaskError::validation(format!("Invalid sort: {} (expected count, name)", args.sort))
    })?;
    let status = parse_status(args.status.as_deref())?;

    let svc = open_service(root_flag)?;
    let mut rows = svc.tag_counts(status, !args.no_untagged)?;
    let limit = args.limit.map(|n| usize::try_from(n).unwrap_or(usize::MAX));
    sort.apply(&mut rows, limit);

    if json_output {
        print_json(&output::json::success(output::json::tag_counts(&rows)));
    } else {
        println!("{}", output::text::render_tag_counts(&rows, status.is_none()));
    }
    Ok(0)
}
