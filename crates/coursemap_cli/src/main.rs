//! CourseMap command-line entry point.
//!
//! # Responsibility
//! - Open the state database and run one store operation per invocation.
//! - Print read models as JSON so output can be piped into other tools.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use coursemap_core::db::open_db;
use coursemap_core::{
    default_log_level, init_logging, CourseDraft, CourseStore, KeyValueStore, ModuleDraft,
    NodePath, Position, SqliteKeyValueStore, StickyDraft, TaskDraft,
};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Inspect and edit a CourseMap state database
#[derive(Parser)]
#[command(name = "coursemap")]
#[command(about = "Command-line interface for the CourseMap mind map")]
struct Cli {
    /// State database file
    #[arg(long, default_value = "coursemap.sqlite3")]
    db: PathBuf,

    /// Write rotating logs into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level when --log-dir is set
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the sample courses to an empty database
    Seed,

    /// List courses with entity counts
    Courses,

    /// Print visible nodes
    Nodes {
        /// Only nodes of this course
        #[arg(long)]
        course: Option<String>,
    },

    /// Print visible connections
    Edges {
        /// Only connections of this course
        #[arg(long)]
        course: Option<String>,
    },

    /// Create a course
    AddCourse {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        category: Option<String>,
        #[command(flatten)]
        at: PositionArgs,
    },

    /// Create a module under a course
    AddModule {
        course: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[command(flatten)]
        at: PositionArgs,
    },

    /// Create a sticky under a module
    AddSticky {
        course: String,
        module: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[command(flatten)]
        at: PositionArgs,
    },

    /// Create a task under a sticky
    AddTask {
        course: String,
        module: String,
        sticky: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[command(flatten)]
        at: PositionArgs,
    },

    /// Move a node to a canvas position
    Move {
        #[command(flatten)]
        node: NodeArgs,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Collapse or expand a course, module or sticky
    Collapse {
        #[command(flatten)]
        node: NodeArgs,
    },

    /// Mark a task done or not done
    Complete {
        #[command(flatten)]
        node: NodeArgs,
    },

    /// Delete a node and everything below it
    Delete {
        #[command(flatten)]
        node: NodeArgs,
    },

    /// Store the canvas pan and zoom
    Canvas {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        scale: f64,
    },

    /// Restore the default canvas pan and zoom
    ResetView,
}

/// Optional explicit placement; auto-layout is used when omitted.
#[derive(Args)]
struct PositionArgs {
    #[arg(long, requires = "y", allow_negative_numbers = true)]
    x: Option<f64>,
    #[arg(long, requires = "x", allow_negative_numbers = true)]
    y: Option<f64>,
}

impl PositionArgs {
    fn position(&self) -> Option<Position> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Position::new(x, y)),
            _ => None,
        }
    }
}

/// Addresses one node by its ancestor chain.
#[derive(Args)]
struct NodeArgs {
    #[arg(long)]
    course: String,
    #[arg(long)]
    module: Option<String>,
    #[arg(long, requires = "module")]
    sticky: Option<String>,
    #[arg(long, requires = "sticky")]
    task: Option<String>,
}

impl NodeArgs {
    fn path(&self) -> Result<NodePath> {
        let path = match (&self.module, &self.sticky, &self.task) {
            (None, None, None) => NodePath::course(&self.course),
            (Some(module), None, None) => NodePath::module(&self.course, module),
            (Some(module), Some(sticky), None) => NodePath::sticky(&self.course, module, sticky),
            (Some(module), Some(sticky), Some(task)) => {
                NodePath::task(&self.course, module, sticky, task)
            }
            _ => bail!("--task needs --sticky, and --sticky needs --module"),
        };
        Ok(path)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CourseListing<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(flatten)]
    summary: coursemap_core::CourseSummary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_dir) = &cli.log_dir {
        start_logging(log_dir, cli.log_level.as_deref())?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open {}", cli.db.display()))?;
    let storage = SqliteKeyValueStore::try_new(&conn)?;
    let mut store = CourseStore::try_load(storage)
        .with_context(|| format!("failed to load state from {}", cli.db.display()))?;
    info!("event=cli_command module=cli status=start");
    execute(&mut store, cli.command)
}

/// Runs one subcommand. Mutations persist through the store itself, so read
/// commands never write the state file.
fn execute<S: KeyValueStore>(store: &mut CourseStore<S>, command: Commands) -> Result<()> {
    match command {
        Commands::Seed => {
            let added = store.seed_sample_courses();
            println!("added {added} sample courses");
        }
        Commands::Courses => {
            let listing = store
                .courses()
                .iter()
                .map(|course| CourseListing {
                    id: &course.id,
                    title: &course.title,
                    summary: coursemap_core::CourseSummary::of(course),
                })
                .collect::<Vec<_>>();
            print_json(&listing)?;
        }
        Commands::Nodes { course } => match course {
            Some(course_id) => print_json(&store.all_nodes_for_course(&course_id))?,
            None => print_json(&store.all_nodes())?,
        },
        Commands::Edges { course } => match course {
            Some(course_id) => print_json(&store.connections_for_course(&course_id))?,
            None => print_json(&store.connections())?,
        },
        Commands::AddCourse {
            title,
            description,
            category,
            at,
        } => {
            let draft = CourseDraft {
                category,
                ..CourseDraft::new(title, description)
            };
            println!("{}", store.add_course(draft, at.position()));
        }
        Commands::AddModule {
            course,
            title,
            description,
            at,
        } => {
            let id = store
                .add_module(&course, ModuleDraft::new(title, description), at.position())
                .ok_or_else(|| anyhow!("no course {course}"))?;
            println!("{id}");
        }
        Commands::AddSticky {
            course,
            module,
            title,
            description,
            at,
        } => {
            let id = store
                .add_sticky(
                    &course,
                    &module,
                    StickyDraft::new(title, description),
                    at.position(),
                )
                .ok_or_else(|| anyhow!("no module {course}/{module}"))?;
            println!("{id}");
        }
        Commands::AddTask {
            course,
            module,
            sticky,
            title,
            description,
            at,
        } => {
            let id = store
                .add_task(
                    &course,
                    &module,
                    &sticky,
                    TaskDraft::new(title, description),
                    at.position(),
                )
                .ok_or_else(|| anyhow!("no sticky {course}/{module}/{sticky}"))?;
            println!("{id}");
        }
        Commands::Move { node, x, y } => {
            let path = node.path()?;
            ensure_applied(
                store.update_node_position(&path, Position::new(x, y)),
                &path,
            )?;
        }
        Commands::Collapse { node } => {
            let path = node.path()?;
            ensure_applied(store.toggle_node_collapse(&path), &path)?;
        }
        Commands::Complete { node } => {
            let path = node.path()?;
            let NodePath::Task {
                course_id,
                module_id,
                sticky_id,
                task_id,
            } = &path
            else {
                bail!("complete needs --task");
            };
            let applied = store.toggle_task_completion(course_id, module_id, sticky_id, task_id);
            ensure_applied(applied, &path)?;
        }
        Commands::Delete { node } => {
            let path = node.path()?;
            let applied = match &path {
                NodePath::Course { course_id } => store.delete_course(course_id),
                NodePath::Module {
                    course_id,
                    module_id,
                } => store.delete_module(course_id, module_id),
                NodePath::Sticky {
                    course_id,
                    module_id,
                    sticky_id,
                } => store.delete_sticky(course_id, module_id, sticky_id),
                NodePath::Task {
                    course_id,
                    module_id,
                    sticky_id,
                    task_id,
                } => store.delete_task(course_id, module_id, sticky_id, task_id),
            };
            ensure_applied(applied, &path)?;
        }
        Commands::Canvas { x, y, scale } => {
            if !store.update_canvas_transform(Position::new(x, y), scale) {
                bail!("canvas transform must be finite");
            }
            println!("scale={}", store.canvas_scale());
        }
        Commands::ResetView => store.reset_canvas_view(),
    }
    Ok(())
}

fn start_logging(log_dir: &Path, level: Option<&str>) -> Result<()> {
    let log_dir = std::path::absolute(log_dir)
        .with_context(|| format!("invalid log directory {}", log_dir.display()))?;
    let log_dir = log_dir
        .to_str()
        .ok_or_else(|| anyhow!("log directory is not valid UTF-8"))?;
    init_logging(level.unwrap_or_else(|| default_log_level()), log_dir).map_err(|err| anyhow!(err))
}

fn ensure_applied(applied: bool, path: &NodePath) -> Result<()> {
    if applied {
        Ok(())
    } else {
        Err(anyhow!("nothing changed at {path}"))
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
