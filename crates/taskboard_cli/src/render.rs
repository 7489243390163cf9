use tabled::{Table, Tabled};
use taskboard_core::model::{Post, Task, TaskCounts};
use taskboard_core::theme::{Palette, Theme};
use taskboard_core::view::Projection;

const BODY_PREVIEW_CHARS: usize = 60;

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "text": task.text,
        "completed": task.completed,
        "createdAt": task.created_at,
    })
}

pub fn print_task_json(task: &Task) {
    println!("{}", task_json(task));
}

pub fn print_tasks_plain(projection: &Projection<'_, Task>, counts: TaskCounts, palette: &Palette) {
    if projection.items.is_empty() {
        println!(
            "{}",
            palette.mutedize("No tasks found. Add one to get started!")
        );
    }

    for task in &projection.items {
        let mark = if task.completed { "[x]" } else { "[ ]" };
        let text = if task.completed {
            palette.mutedize(&task.text)
        } else {
            task.text.clone()
        };
        println!(
            "{} {} | {} | {}",
            mark,
            palette.accentize(&task.id.to_string()),
            text,
            task.created_at
        );
    }

    println!(
        "All ({}) | Active ({}) | Completed ({})",
        counts.all, counts.active, counts.completed
    );
    if projection.total_pages > 1 {
        println!("Page {} of {}", projection.page, projection.total_pages);
    }
    println!("{} task{} remaining", counts.active, plural(counts.active));
}

pub fn print_tasks_json(projection: &Projection<'_, Task>, counts: TaskCounts) {
    let tasks: Vec<serde_json::Value> = projection.items.iter().map(|task| task_json(task)).collect();
    let json = serde_json::json!({
        "tasks": tasks,
        "total_matched": projection.total_matched,
        "total_pages": projection.total_pages,
        "page": projection.page,
        "counts": {
            "all": counts.all,
            "active": counts.active,
            "completed": counts.completed,
        },
    });
    println!("{json}");
}

#[derive(Tabled)]
struct PostRow {
    #[tabled(rename = "#")]
    id: u64,
    title: String,
    body: String,
}

fn preview(text: &str) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= BODY_PREVIEW_CHARS {
        flattened
    } else {
        let cut: String = flattened.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{cut}...")
    }
}

pub fn print_posts_plain(projection: &Projection<'_, Post>, palette: &Palette) {
    let found = projection.total_matched;
    println!(
        "{}",
        palette.accentize(&format!("Found {} post{}", found, plural(found)))
    );

    if !projection.items.is_empty() {
        let rows = projection.items.iter().map(|post| PostRow {
            id: post.id,
            title: post.title.clone(),
            body: preview(&post.body),
        });
        println!("{}", Table::new(rows));
    }

    if projection.total_pages > 1 {
        println!(
            "{}",
            palette.mutedize(&format!(
                "Page {} of {}",
                projection.page, projection.total_pages
            ))
        );
    }
}

pub fn print_posts_json(projection: &Projection<'_, Post>) {
    let json = serde_json::json!({
        "posts": projection.items,
        "total_matched": projection.total_matched,
        "total_pages": projection.total_pages,
        "page": projection.page,
    });
    println!("{json}");
}

pub fn print_theme(theme: Theme, json: bool, changed: bool) {
    if json {
        println!("{}", serde_json::json!({ "theme": theme.as_str() }));
    } else if changed {
        println!("Theme set to {theme}");
    } else {
        println!("Theme: {theme}");
    }
}
