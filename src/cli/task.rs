use std::path::Path;

use crate::cli::commands::{Commands, UpdateArgs};
use crate::cli::{finish, open_service, print_json};
use crate::error::TaskError;
use crate::models::{Effort, Priority, Task};
use crate::output;
use crate::service::{NewTask, TaskService, TaskUpdate};

pub fn run(cmd: Commands, json_output: bool, root_flag: Option<&Path>) -> i32 {
    let result = open_service(root_flag).and_then(|svc| dispatch(&svc, cmd, json_output));
    finish(result, json_output)
}

fn dispatch(svc: &TaskService, cmd: Commands, json_output: bool) -> Result<i32, TaskError> {
    match cmd {
        Commands::Create {
            name,
            summary,
            priority,
            effort,
            owner,
            tags,
            depends_on,
        } => {
            let task = svc.create(NewTask {
                name,
                summary,
                priority: Priority::parse(&priority)?,
                effort: Effort::parse(&effort)?,
                owner,
                tags,
                depends_on,
            })?;
            report(&task, json_output, || {
                format!("Created: {} ({})", task.metadata.task_name, task.metadata.task_id)
            });
        }
        Commands::Start { task, force } => {
            let task = svc.start(&task, force)?;
            report(&task, json_output, || format!("Started: {}", task.metadata.task_name));
        }
        Commands::Complete { task } => {
            let task = svc.complete(&task)?;
            report(&task, json_output, || format!("Completed: {}", task.metadata.task_name));
        }
        Commands::View { task } => {
            let view = svc.view(&task)?;
            if json_output {
                print_json(&output::json::success(output::json::task_detail(&view)));
            } else {
                println!("{}", output::text::render_task_detail(&view));
            }
        }
        Commands::Update(args) => {
            let task = run_update(svc, args)?;
            report(&task, json_output, || format!("Updated: {}", task.metadata.task_name));
        }
        Commands::Log { task, note, actor } => {
            let task = svc.log_activity(&task, &note, &actor)?;
            report(&task, json_output, || format!("Logged: {}", task.metadata.task_name));
        }
        Commands::Rename { task, new_name } => {
            let task = svc.rename(&task, &new_name)?;
            report(&task, json_output, || format!("Renamed: {}", task.metadata.task_name));
        }
        Commands::Delete { task: selector, hard } => {
            let task = svc.delete(&selector, hard)?;
            report(&task, json_output, || {
                if hard {
                    format!("Hard deleted: {selector}")
                } else {
                    format!("Moved to trash: {selector}")
                }
            });
        }
        Commands::Init(_) | Commands::List(_) | Commands::Tags(_) => {
            return Err(TaskError::validation("command is not handled here"));
        }
    }
    Ok(0)
}

fn run_update(svc: &TaskService, args: UpdateArgs) -> Result<Task, TaskError> {
    let changes = TaskUpdate {
        priority: args.priority.as_deref().map(Priority::parse).transpose()?,
        effort: args.effort.as_deref().map(Effort::parse).transpose()?,
        owner: args.owner,
        tags: args.tags,
        replace_tags: args.replace_tags,
        depends_on: args.depends_on,
        clear_depends_on: args.clear_depends_on,
        note: args.note,
    };
    svc.update(&args.task, changes)
}

fn report(task: &Task, json_output: bool, message: impl FnOnce() -> String) {
    if json_output {
        print_json(&output::json::success(output::json::task_summary(task)));
    } else {
        println!("{}", message());
    }
}
