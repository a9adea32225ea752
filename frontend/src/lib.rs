use sauron::{
    html::{attributes::*, form, *},
    prelude::*,
};
use shared::{CreateTaskRequest, Priority, Task, UpdateTaskRequest};

pub mod api;

use api::{ApiClient, RequestError};

const LOAD_FAILED: &str = "Failed to load tasks";
const CREATE_FAILED: &str = "Failed to create task";
const UPDATE_FAILED: &str = "Failed to update task";
const DELETE_FAILED: &str = "Failed to delete task";

#[derive(Debug, Clone)]
pub enum Msg {
    // Reload cycle
    LoadTasks,
    TasksLoaded(Vec<Task>),

    // Creation form
    ToggleForm,
    SetTitle(String),
    SetDescription(String),
    SetPriority(Priority),
    SubmitCreate,
    TaskCreated,

    // Per-task mutations
    ToggleTask(i64),
    TaskUpdated,
    DeleteTask(i64),
    TaskDeleted,

    RequestFailed(&'static str, RequestError),
}

#[derive(Debug, Clone)]
pub struct Model {
    api: ApiClient,
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
    show_form: bool,
    form: CreateTaskRequest,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            api: ApiClient::default(),
            tasks: Vec::new(),
            loading: true,
            error: None,
            show_form: false,
            form: CreateTaskRequest::default(),
        }
    }
}

impl Application for Model {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        self.api = ApiClient::from_document();
        self.reload()
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::LoadTasks => self.reload(),
            Msg::TasksLoaded(tasks) => {
                self.tasks = tasks;
                self.error = None;
                self.loading = false;
                Cmd::none()
            }
            Msg::ToggleForm => {
                self.show_form = !self.show_form;
                Cmd::none()
            }
            Msg::SetTitle(title) => {
                self.form.title = title;
                Cmd::none()
            }
            Msg::SetDescription(description) => {
                self.form.description = description;
                Cmd::none()
            }
            Msg::SetPriority(priority) => {
                self.form.priority = priority;
                Cmd::none()
            }
            Msg::SubmitCreate => {
                // Non-empty title is enforced by the form control itself.
                let api = self.api.clone();
                let request = self.form.clone();
                Cmd::new(async move {
                    match api.create_task(&request).await {
                        Ok(_) => Msg::TaskCreated,
                        Err(e) => Msg::RequestFailed(CREATE_FAILED, e),
                    }
                })
            }
            Msg::TaskCreated => {
                self.form = CreateTaskRequest::default();
                self.show_form = false;
                self.reload()
            }
            Msg::ToggleTask(id) => {
                let Some(request) = self.toggle_patch(id) else {
                    return Cmd::none();
                };
                let api = self.api.clone();
                Cmd::new(async move {
                    match api.update_task(id, &request).await {
                        Ok(_) => Msg::TaskUpdated,
                        Err(e) => Msg::RequestFailed(UPDATE_FAILED, e),
                    }
                })
            }
            Msg::TaskUpdated => self.reload(),
            Msg::DeleteTask(id) => {
                if !confirm("Are you sure you want to delete this task?") {
                    return Cmd::none();
                }
                let api = self.api.clone();
                Cmd::new(async move {
                    match api.delete_task(id).await {
                        Ok(()) => Msg::TaskDeleted,
                        Err(e) => Msg::RequestFailed(DELETE_FAILED, e),
                    }
                })
            }
            Msg::TaskDeleted => self.reload(),
            Msg::RequestFailed(message, cause) => {
                log_failure(message, &cause);
                self.error = Some(message.to_string());
                // The cache keeps its last known-good contents.
                self.loading = false;
                Cmd::none()
            }
        }
    }

    fn view(&self) -> Node<Msg> {
        div(
            [class("min-h-screen bg-ctp-base text-ctp-text py-8 px-4")],
            [div(
                [class("max-w-4xl mx-auto")],
                [
                    self.view_header(),
                    self.view_stats(),
                    self.view_error_banner(),
                    self.view_form_toggle(),
                    if self.show_form {
                        self.view_create_form()
                    } else {
                        span([], [])
                    },
                    if self.loading {
                        self.view_loading()
                    } else {
                        self.view_task_list()
                    },
                ],
            )],
        )
    }
}

impl Model {
    /// Tasks not yet completed, in cache order.
    pub fn active_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !t.completed).collect()
    }

    /// Completed tasks, in cache order.
    pub fn completed_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.completed).collect()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Builds the completion-flip patch for a cached task, or `None` if
    /// the id is not in the cache.
    fn toggle_patch(&self, id: i64) -> Option<UpdateTaskRequest> {
        let task = self.tasks.iter().find(|t| t.id == id)?;
        Some(UpdateTaskRequest {
            completed: Some(!task.completed),
            ..UpdateTaskRequest::default()
        })
    }

    fn reload(&mut self) -> Cmd<Msg> {
        self.loading = true;
        let api = self.api.clone();
        Cmd::new(async move {
            match api.list_tasks().await {
                Ok(tasks) => Msg::TasksLoaded(tasks),
                Err(e) => Msg::RequestFailed(LOAD_FAILED, e),
            }
        })
    }

    fn view_header(&self) -> Node<Msg> {
        div([class("text-center mb-12")], [
            h1([class("text-5xl font-bold mb-4 text-ctp-text")], [text("Task Manager")]),
            p([class("text-ctp-subtext0 text-lg")], [text("Organize your work with style")]),
        ])
    }

    fn view_stats(&self) -> Node<Msg> {
        div([class("grid grid-cols-1 md:grid-cols-3 gap-4 mb-8")], [
            self.stat_card("Total Tasks", self.tasks.len(), "text-ctp-blue"),
            self.stat_card("Active", self.active_tasks().len(), "text-ctp-yellow"),
            self.stat_card("Completed", self.completed_tasks().len(), "text-ctp-green"),
        ])
    }

    fn stat_card(&self, label: &str, count: usize, color_class: &str) -> Node<Msg> {
        div(
            [class("bg-ctp-surface0 rounded-lg p-6 text-center border border-ctp-surface1")],
            [
                div([class(&format!("text-3xl font-bold {}", color_class))], [text(count.to_string())]),
                div([class("text-ctp-subtext0 text-sm mt-1")], [text(label)]),
            ],
        )
    }

    fn view_error_banner(&self) -> Node<Msg> {
        match &self.error {
            Some(message) => div(
                [class("bg-ctp-red/10 border border-ctp-red/20 rounded-lg p-4 mb-6")],
                [p([class("text-ctp-red")], [text(message)])],
            ),
            None => span([], []),
        }
    }

    fn view_form_toggle(&self) -> Node<Msg> {
        div([class("mb-6")], [button(
            [
                on_click(|_| Msg::ToggleForm),
                class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-6 py-2 rounded-md transition-colors duration-200 w-full md:w-auto"),
            ],
            [if self.show_form {
                text("✕ Cancel")
            } else {
                text("+ New Task")
            }],
        )])
    }

    fn view_create_form(&self) -> Node<Msg> {
        div(
            [class("mb-8 p-6 bg-ctp-surface0 rounded-lg border border-ctp-surface1")],
            [
                h2([class("text-xl font-semibold text-ctp-text mb-4")], [text("Create New Task")]),
                form(
                    [
                        class("space-y-4"),
                        on_submit(|event| {
                            event.prevent_default();
                            Msg::SubmitCreate
                        }),
                    ],
                    [
                        div([], [
                            label([class("block text-sm font-medium text-ctp-subtext1 mb-2")], [text("Title")]),
                            input([
                                r#type("text"),
                                required(true),
                                placeholder("Enter task title..."),
                                value(&self.form.title),
                                on_input(|event| Msg::SetTitle(event.value())),
                                class("w-full px-3 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue focus:border-transparent"),
                            ], []),
                        ]),
                        div([], [
                            label([class("block text-sm font-medium text-ctp-subtext1 mb-2")], [text("Description")]),
                            textarea([
                                placeholder("Enter task description..."),
                                value(&self.form.description),
                                on_input(|event| Msg::SetDescription(event.value())),
                                class("w-full px-3 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue focus:border-transparent h-20 resize-y"),
                            ], []),
                        ]),
                        div([], [
                            label([class("block text-sm font-medium text-ctp-subtext1 mb-2")], [text("Priority")]),
                            select(
                                [
                                    on_change(|event| {
                                        Msg::SetPriority(
                                            Priority::from_value(&event.value()).unwrap_or_default(),
                                        )
                                    }),
                                    class("w-full px-3 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text focus:outline-none focus:ring-2 focus:ring-ctp-blue focus:border-transparent"),
                                ],
                                Priority::ALL
                                    .iter()
                                    .map(|priority| {
                                        option(
                                            [
                                                value(priority.as_str()),
                                                selected(self.form.priority == *priority),
                                            ],
                                            [text(priority.label())],
                                        )
                                    })
                                    .collect::<Vec<_>>(),
                            ),
                        ]),
                        div([class("flex gap-3")], [
                            button([
                                r#type("submit"),
                                class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-6 py-2 rounded-md transition-colors duration-200"),
                            ], [text("Create Task")]),
                            button([
                                r#type("button"),
                                on_click(|_| Msg::ToggleForm),
                                class("bg-ctp-overlay0 hover:bg-ctp-overlay1 text-ctp-text font-medium px-6 py-2 rounded-md transition-colors duration-200"),
                            ], [text("Cancel")]),
                        ]),
                    ],
                ),
            ],
        )
    }

    fn view_loading(&self) -> Node<Msg> {
        div([class("text-center py-12")], [
            div([class("inline-block animate-spin rounded-full h-12 w-12 border-4 border-ctp-blue border-t-transparent")], []),
            p([class("text-ctp-subtext0 mt-4")], [text("Loading tasks...")]),
        ])
    }

    fn view_task_list(&self) -> Node<Msg> {
        let active_tasks = self.active_tasks();
        let completed_tasks = self.completed_tasks();

        div([class("space-y-6")], [
            if active_tasks.is_empty() {
                span([], [])
            } else {
                div([], [
                    h2([class("text-2xl font-semibold mb-4 text-ctp-text")], [text("Active Tasks")]),
                    div(
                        [class("space-y-3")],
                        active_tasks.iter().map(|task| self.view_task(task)).collect::<Vec<_>>(),
                    ),
                ])
            },
            if completed_tasks.is_empty() {
                span([], [])
            } else {
                div([], [
                    h2([class("text-2xl font-semibold mb-4 text-ctp-text")], [text("Completed Tasks")]),
                    div(
                        [class("space-y-3")],
                        completed_tasks.iter().map(|task| self.view_task(task)).collect::<Vec<_>>(),
                    ),
                ])
            },
            if self.tasks.is_empty() {
                div([class("text-center py-12")], [
                    div([class("text-6xl mb-4")], [text("📝")]),
                    h3([class("text-xl font-medium text-ctp-text mb-2")], [text("No tasks yet")]),
                    p([class("text-ctp-subtext0")], [text("Create your first task to get started!")]),
                ])
            } else {
                span([], [])
            },
        ])
    }

    fn view_task(&self, task: &Task) -> Node<Msg> {
        div(
            [
                key(task.id.to_string()),
                class(&format!(
                    "rounded-lg p-6 bg-ctp-surface0 border transition-all duration-200 group {}",
                    if task.completed {
                        "border-ctp-surface1 opacity-60 hover:opacity-100"
                    } else {
                        "border-ctp-surface1 hover:border-ctp-blue/50"
                    }
                )),
            ],
            [div([class("flex items-start gap-4")], [
                button(
                    [
                        on_click({
                            let task_id = task.id;
                            move |_| Msg::ToggleTask(task_id)
                        }),
                        r#type("button"),
                        class(&format!(
                            "mt-1 w-6 h-6 rounded border-2 flex items-center justify-center flex-shrink-0 transition-colors {}",
                            if task.completed {
                                "border-ctp-green bg-ctp-green"
                            } else {
                                "border-ctp-surface2 hover:border-ctp-blue"
                            }
                        )),
                    ],
                    [if task.completed {
                        span([class("text-ctp-base text-sm font-bold")], [text("✓")])
                    } else {
                        span([], [])
                    }],
                ),
                div([class("flex-1 min-w-0")], [
                    div([class("flex items-start justify-between gap-4 mb-2")], [
                        h3(
                            [class(&format!(
                                "text-lg font-medium {}",
                                if task.completed {
                                    "text-ctp-subtext0 line-through"
                                } else {
                                    "text-ctp-text"
                                }
                            ))],
                            [text(&task.title)],
                        ),
                        span(
                            [class(&format!(
                                "px-3 py-1 rounded-full text-xs font-medium border {}",
                                priority_classes(task.priority)
                            ))],
                            [text(task.priority.as_str())],
                        ),
                    ]),
                    if task.description.is_empty() {
                        span([], [])
                    } else {
                        p(
                            [class(&format!(
                                "text-sm mb-3 break-words {}",
                                if task.completed {
                                    "text-ctp-overlay0 line-through"
                                } else {
                                    "text-ctp-subtext1"
                                }
                            ))],
                            [text(&task.description)],
                        )
                    },
                    div([class("flex items-center justify-between")], [
                        span([class("text-xs text-ctp-overlay1")], [
                            if task.completed {
                                text(&format!("Completed {}", date_part(&task.updated_at)))
                            } else {
                                text(&format!("Created {}", date_part(&task.created_at)))
                            },
                        ]),
                        button([
                            on_click({
                                let task_id = task.id;
                                move |_| Msg::DeleteTask(task_id)
                            }),
                            r#type("button"),
                            class("text-ctp-red hover:text-ctp-maroon text-sm opacity-0 group-hover:opacity-100 transition-opacity"),
                        ], [text("Delete")]),
                    ]),
                ]),
            ])],
        )
    }
}

fn priority_classes(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "text-ctp-red bg-ctp-red/10 border-ctp-red/20",
        Priority::Medium => "text-ctp-yellow bg-ctp-yellow/10 border-ctp-yellow/20",
        Priority::Low => "text-ctp-green bg-ctp-green/10 border-ctp-green/20",
    }
}

fn date_part(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

#[cfg(target_arch = "wasm32")]
fn log_failure(message: &str, cause: &RequestError) {
    web_sys::console::error_1(&format!("{}: {}", message, cause).into());
}

#[cfg(not(target_arch = "wasm32"))]
fn log_failure(message: &str, cause: &RequestError) {
    eprintln!("{}: {}", message, cause);
}

#[cfg(target_arch = "wasm32")]
fn confirm(message: &str) -> bool {
    web_sys::window()
        .map(|window| window.confirm_with_message(message).unwrap_or(false))
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
fn confirm(_message: &str) -> bool {
    false
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    Program::mount_to_body(Model::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, completed: bool) -> Task {
        Task {
            id,
            title: format!("task {}", id),
            description: String::new(),
            completed,
            priority: Priority::Medium,
            created_at: "2025-03-01T09:30:00Z".to_string(),
            updated_at: "2025-03-02T10:00:00Z".to_string(),
        }
    }

    fn loaded(tasks: Vec<Task>) -> Model {
        let mut model = Model::default();
        let _ = model.update(Msg::TasksLoaded(tasks));
        model
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        let model = loaded(vec![
            task(1, false),
            task(2, true),
            task(3, false),
            task(4, true),
            task(5, false),
        ]);

        let active: Vec<i64> = model.active_tasks().iter().map(|t| t.id).collect();
        let completed: Vec<i64> = model.completed_tasks().iter().map(|t| t.id).collect();

        assert_eq!(active.len() + completed.len(), model.tasks().len());
        assert!(active.iter().all(|id| !completed.contains(id)));
        // Relative cache order is preserved within each partition.
        assert_eq!(active, vec![1, 3, 5]);
        assert_eq!(completed, vec![2, 4]);
    }

    #[test]
    fn reload_result_is_idempotent() {
        let list = vec![task(1, false), task(2, true)];
        let mut model = loaded(list.clone());
        let _ = model.update(Msg::TasksLoaded(list.clone()));
        assert_eq!(model.tasks(), list.as_slice());
    }

    #[test]
    fn successful_load_clears_error_and_loading() {
        let mut model = Model::default();
        assert!(model.is_loading());

        let _ = model.update(Msg::RequestFailed(
            LOAD_FAILED,
            RequestError::Transport("connection refused".to_string()),
        ));
        assert_eq!(model.error(), Some(LOAD_FAILED));

        let _ = model.update(Msg::TasksLoaded(vec![task(1, false)]));
        assert_eq!(model.error(), None);
        assert!(!model.is_loading());
    }

    #[test]
    fn failed_load_keeps_previous_cache() {
        let list = vec![task(1, false), task(2, true)];
        let mut model = loaded(list.clone());

        let _ = model.update(Msg::LoadTasks);
        assert!(model.is_loading());

        let _ = model.update(Msg::RequestFailed(
            LOAD_FAILED,
            RequestError::Status {
                status: 500,
                url: "/api/tasks".to_string(),
            },
        ));

        assert_eq!(model.tasks(), list.as_slice());
        assert_eq!(model.error(), Some(LOAD_FAILED));
        assert!(!model.is_loading());
    }

    #[test]
    fn each_operation_reports_its_own_message() {
        for message in [CREATE_FAILED, UPDATE_FAILED, DELETE_FAILED] {
            let mut model = loaded(vec![task(1, false)]);
            let _ = model.update(Msg::RequestFailed(
                message,
                RequestError::Transport("boom".to_string()),
            ));
            assert_eq!(model.error(), Some(message));
            assert_eq!(model.tasks().len(), 1);
        }
    }

    #[test]
    fn form_edits_accumulate_in_draft() {
        let mut model = Model::default();
        let _ = model.update(Msg::ToggleForm);
        let _ = model.update(Msg::SetTitle("Buy milk".to_string()));
        let _ = model.update(Msg::SetDescription("2 liters".to_string()));
        let _ = model.update(Msg::SetPriority(Priority::High));

        assert!(model.show_form);
        assert_eq!(model.form.title, "Buy milk");
        assert_eq!(model.form.description, "2 liters");
        assert_eq!(model.form.priority, Priority::High);
    }

    #[test]
    fn create_success_clears_form_and_reloads() {
        let mut model = Model::default();
        let _ = model.update(Msg::ToggleForm);
        let _ = model.update(Msg::SetTitle("Buy milk".to_string()));
        let _ = model.update(Msg::SetPriority(Priority::Low));

        let _ = model.update(Msg::TaskCreated);

        assert!(!model.show_form);
        assert_eq!(model.form.title, "");
        assert_eq!(model.form.priority, Priority::Medium);
        // TaskCreated re-enters the loading state for the reload.
        assert!(model.is_loading());
    }

    #[test]
    fn create_failure_retains_form_state() {
        let mut model = Model::default();
        let _ = model.update(Msg::ToggleForm);
        let _ = model.update(Msg::SetTitle("Buy milk".to_string()));

        let _ = model.update(Msg::RequestFailed(
            CREATE_FAILED,
            RequestError::Transport("boom".to_string()),
        ));

        assert!(model.show_form);
        assert_eq!(model.form.title, "Buy milk");
        assert_eq!(model.error(), Some(CREATE_FAILED));
    }

    #[test]
    fn mutation_success_reenters_loading() {
        let mut model = loaded(vec![task(1, false)]);
        assert!(!model.is_loading());

        let _ = model.update(Msg::TaskUpdated);
        assert!(model.is_loading());

        let mut model = loaded(vec![task(1, false)]);
        let _ = model.update(Msg::TaskDeleted);
        assert!(model.is_loading());
    }

    #[test]
    fn toggle_patch_flips_the_cached_completion() {
        let model = loaded(vec![task(1, false), task(2, true)]);

        let patch = model.toggle_patch(1).unwrap();
        assert_eq!(patch.completed, Some(true));
        // Only the completion flag travels; the server keeps the rest.
        assert_eq!(patch.title, None);
        assert_eq!(patch.description, None);
        assert_eq!(patch.priority, None);

        let patch = model.toggle_patch(2).unwrap();
        assert_eq!(patch.completed, Some(false));

        assert!(model.toggle_patch(99).is_none());
    }

    #[test]
    fn delete_without_confirmation_is_a_no_op() {
        // On non-wasm targets the confirm gate always answers no, so the
        // delete must not dispatch, mutate the cache, or flag an error.
        let mut model = loaded(vec![task(1, false)]);
        let _ = model.update(Msg::DeleteTask(1));

        assert_eq!(model.tasks().len(), 1);
        assert_eq!(model.error(), None);
        assert!(!model.is_loading());
    }

    #[test]
    fn toggle_of_unknown_id_is_a_no_op() {
        let mut model = loaded(vec![task(1, false)]);
        let _ = model.update(Msg::ToggleTask(99));
        assert_eq!(model.tasks().len(), 1);
        assert_eq!(model.error(), None);
        assert!(!model.is_loading());
    }

    #[test]
    fn date_part_drops_the_time_component() {
        assert_eq!(date_part("2025-03-01T09:30:00Z"), "2025-03-01");
        assert_eq!(date_part("2025-03-01"), "2025-03-01");
    }
}
