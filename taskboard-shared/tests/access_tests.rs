/// Integration tests for the membership-scoped access layer
///
/// Run against the in-memory store, so no database is needed.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use taskboard_shared::access::{AccessError, AccessLayer};
use taskboard_shared::auth::middleware::AuthContext;
use taskboard_shared::identity::{IdentityService, IdentitySettings, SignUp};
use taskboard_shared::models::comment::NewComment;
use taskboard_shared::models::membership::{CreateMembership, MembershipRole};
use taskboard_shared::models::notification::NotificationKind;
use taskboard_shared::models::project::{NewProject, ProjectStatus, UpdateProject};
use taskboard_shared::models::task::{NewTask, TaskPriority, TaskStatus, UpdateTask};
use taskboard_shared::models::team_member::Presence;
use taskboard_shared::outcome::Outcome;
use taskboard_shared::store::{MemoryStore, Store};
use taskboard_shared::views::{NotificationListState, ProjectListState, TaskListState};

const SECRET: &str = "access-tests-secret-at-least-32-bytes!";

struct Harness {
    store: Arc<MemoryStore>,
    identity: IdentityService,
    access: AccessLayer,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            identity: IdentityService::new(store.clone(), IdentitySettings::new(SECRET)),
            access: AccessLayer::new(store.clone()),
            store,
        }
    }

    async fn user(&self, first: &str, last: &str, role: &str) -> AuthContext {
        let signed_in = self
            .identity
            .sign_up(SignUp {
                email: format!("{}.{}@example.com", first, last).to_lowercase(),
                password: "Sup3r$ecret".to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                role: role.to_string(),
                department: "Engineering".to_string(),
            })
            .await
            .unwrap();

        self.identity
            .authenticate(&signed_in.access_token)
            .await
            .unwrap()
    }
}

fn due() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn roadmap(team_member_ids: Vec<Uuid>) -> NewProject {
    NewProject {
        name: "Roadmap".to_string(),
        description: "Plan for next year".to_string(),
        due_date: due(),
        color: "bg-blue-500".to_string(),
        team_member_ids,
    }
}

fn new_task(name: &str, project_id: Uuid, assignee_id: Uuid, priority: TaskPriority) -> NewTask {
    NewTask {
        name: name.to_string(),
        description: String::new(),
        project_id,
        assignee_id,
        priority,
        due_date: due(),
    }
}

#[tokio::test]
async fn test_roadmap_scenario() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;
    let bob = h.user("Bob", "Smith", "Developer").await;

    let me = h.identity.profile(&jane).await.unwrap();
    assert_eq!(me.full_name(), "Jane Doe");

    // Create
    let project = h.access.create_project(&jane, roadmap(vec![])).await.ok().unwrap();
    assert_eq!(project.project.status, ProjectStatus::Active);
    assert_eq!(project.progress, 0);
    assert!(project.tasks.is_empty());
    assert_eq!(project.team_members.len(), 1);
    let owner = project.owner().unwrap();
    assert_eq!(owner.user.id, jane.user_id);
    assert_eq!(owner.project_role, MembershipRole::Owner);

    let projects = h.access.get_projects(&jane).await.ok().unwrap();
    assert_eq!(projects.len(), 1);
    let id = project.project.id;

    // Add Bob
    let membership = h
        .access
        .add_team_member_to_project(&jane, id, bob.user_id)
        .await
        .ok()
        .unwrap();
    assert_eq!(membership.role, MembershipRole::Member);

    let details = h.access.get_project_by_id(&jane, id).await.ok().unwrap();
    assert_eq!(details.team_members.len(), 2);

    // Adding Bob again fails and changes nothing
    let again = h.access.add_team_member_to_project(&jane, id, bob.user_id).await;
    assert!(matches!(again.failure(), Some(AccessError::Conflict(_))));
    let details = h.access.get_project_by_id(&jane, id).await.ok().unwrap();
    assert_eq!(details.team_members.len(), 2);

    // Task for Bob
    let task = h
        .access
        .create_task(&jane, new_task("Draft Q1 goals", id, bob.user_id, TaskPriority::High))
        .await
        .ok()
        .unwrap();
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.priority, TaskPriority::High);

    let tasks = h.access.get_tasks_by_project(&jane, id).await.ok().unwrap();
    assert_eq!(tasks, vec![task.clone()]);

    let bobs = h.access.get_my_tasks(&bob).await.ok().unwrap();
    assert_eq!(bobs, vec![task]);
}

#[tokio::test]
async fn test_create_project_ignores_owner_and_duplicate_ids() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;
    let bob = h.user("Bob", "Smith", "Developer").await;

    let project = h
        .access
        .create_project(
            &jane,
            roadmap(vec![bob.user_id, jane.user_id, bob.user_id]),
        )
        .await
        .ok()
        .unwrap();

    assert_eq!(project.team_members.len(), 2);
    let owners = project
        .team_members
        .iter()
        .filter(|m| m.project_role == MembershipRole::Owner)
        .count();
    assert_eq!(owners, 1);
}

#[tokio::test]
async fn test_failed_project_creation_leaves_no_rows() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;

    let outcome = h
        .access
        .create_project(&jane, roadmap(vec![Uuid::new_v4()]))
        .await;

    assert!(matches!(outcome.failure(), Some(AccessError::NotFound(_))));
    assert_eq!(h.store.project_count().await, 0);
    assert_eq!(h.store.membership_count().await, 0);
    assert!(h.access.get_projects(&jane).await.is_empty());
}

#[tokio::test]
async fn test_create_project_validates_input() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;

    let mut request = roadmap(vec![]);
    request.name = String::new();
    request.color = "not a color!".to_string();

    let outcome = h.access.create_project(&jane, request).await;
    assert!(matches!(outcome.failure(), Some(AccessError::Validation(_))));
    assert_eq!(h.store.project_count().await, 0);
}

#[tokio::test]
async fn test_non_members_see_nothing() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;
    let eve = h.user("Eve", "Stone", "Analyst").await;

    let project = h.access.create_project(&jane, roadmap(vec![])).await.ok().unwrap();
    let id = project.project.id;
    let task = h
        .access
        .create_task(&jane, new_task("Secret", id, jane.user_id, TaskPriority::Low))
        .await
        .ok()
        .unwrap();

    assert!(h.access.get_projects(&eve).await.is_empty());
    assert!(h.access.get_project_by_id(&eve, id).await.is_empty());
    assert!(h.access.get_tasks_by_project(&eve, id).await.is_empty());
    assert!(h.access.get_task(&eve, task.id).await.is_empty());

    // Writes against an invisible project look like a missing one
    let add = h.access.add_team_member_to_project(&eve, id, eve.user_id).await;
    assert!(matches!(add.failure(), Some(AccessError::NotFound(_))));

    let create = h
        .access
        .create_task(&eve, new_task("Sneaky", id, eve.user_id, TaskPriority::Low))
        .await;
    assert!(matches!(create.failure(), Some(AccessError::NotFound(_))));

    let update = h
        .access
        .update_task(
            &eve,
            task.id,
            UpdateTask {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(update.failure(), Some(AccessError::NotFound(_))));
}

#[tokio::test]
async fn test_members_cannot_manage_project() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;
    let bob = h.user("Bob", "Smith", "Developer").await;
    let eve = h.user("Eve", "Stone", "Analyst").await;

    let project = h
        .access
        .create_project(&jane, roadmap(vec![bob.user_id]))
        .await
        .ok()
        .unwrap();
    let id = project.project.id;

    let add = h.access.add_team_member_to_project(&bob, id, eve.user_id).await;
    assert!(matches!(add.failure(), Some(AccessError::Forbidden(_))));

    let rename = h
        .access
        .update_project(
            &bob,
            id,
            UpdateProject {
                name: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(rename.failure(), Some(AccessError::Forbidden(_))));

    // Members may still create tasks
    let task = h
        .access
        .create_task(&bob, new_task("Set up CI", id, bob.user_id, TaskPriority::Medium))
        .await;
    assert!(task.is_ok());
}

#[tokio::test]
async fn test_task_for_unknown_assignee_is_not_found() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;
    let project = h.access.create_project(&jane, roadmap(vec![])).await.ok().unwrap();

    let outcome = h
        .access
        .create_task(
            &jane,
            new_task("Orphan", project.project.id, Uuid::new_v4(), TaskPriority::Low),
        )
        .await;
    assert!(matches!(outcome.failure(), Some(AccessError::NotFound(_))));
}

#[tokio::test]
async fn test_update_task_and_progress() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;
    let project = h.access.create_project(&jane, roadmap(vec![])).await.ok().unwrap();
    let id = project.project.id;

    let mut ids = Vec::new();
    for name in ["One", "Two", "Three"] {
        let task = h
            .access
            .create_task(&jane, new_task(name, id, jane.user_id, TaskPriority::Medium))
            .await
            .ok()
            .unwrap();
        ids.push(task.id);
    }

    let done = h
        .access
        .update_task(
            &jane,
            ids[0],
            UpdateTask {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        )
        .await
        .ok()
        .unwrap();
    assert_eq!(done.status, TaskStatus::Done);

    h.access
        .update_task(
            &jane,
            ids[1],
            UpdateTask {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        )
        .await
        .ok()
        .unwrap();

    let details = h.access.get_project_by_id(&jane, id).await.ok().unwrap();
    assert_eq!(details.completed_tasks(), 2);
    assert_eq!(details.progress, 67);

    // Done back to todo is allowed
    let reopened = h
        .access
        .update_task(
            &jane,
            ids[1],
            UpdateTask {
                status: Some(TaskStatus::Todo),
                ..Default::default()
            },
        )
        .await
        .ok()
        .unwrap();
    assert_eq!(reopened.status, TaskStatus::Todo);

    let details = h.access.get_project_by_id(&jane, id).await.ok().unwrap();
    assert_eq!(details.progress, 33);

    let fetched = h.access.get_task(&jane, ids[0]).await.ok().unwrap();
    assert_eq!(fetched, done);

    let missing = h
        .access
        .update_task(&jane, Uuid::new_v4(), UpdateTask::default())
        .await;
    assert!(matches!(missing.failure(), Some(AccessError::NotFound(_))));
}

#[tokio::test]
async fn test_update_project() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;
    let project = h.access.create_project(&jane, roadmap(vec![])).await.ok().unwrap();

    let updated = h
        .access
        .update_project(
            &jane,
            project.project.id,
            UpdateProject {
                status: Some(ProjectStatus::Review),
                color: Some("bg-green-500".to_string()),
                ..Default::default()
            },
        )
        .await
        .ok()
        .unwrap();

    assert_eq!(updated.project.status, ProjectStatus::Review);
    assert_eq!(updated.project.color, "bg-green-500");
    assert_eq!(updated.project.name, "Roadmap");
    assert_eq!(updated.team_members.len(), 1);
}

#[tokio::test]
async fn test_projects_are_newest_first() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;

    for name in ["First", "Second"] {
        let mut request = roadmap(vec![]);
        request.name = name.to_string();
        assert!(h.access.create_project(&jane, request).await.is_ok());
    }

    let names: Vec<String> = h
        .access
        .get_projects(&jane)
        .await
        .ok()
        .unwrap()
        .into_iter()
        .map(|p| p.project.name)
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_team_directory() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;
    h.user("Alice", "Young", "Designer").await;
    h.user("Bob", "Smith", "Developer").await;

    let team = h.access.get_team_members(&jane).await.ok().unwrap();

    let first_names: Vec<&str> = team.iter().map(|m| m.user.first_name.as_str()).collect();
    assert_eq!(first_names, vec!["Alice", "Bob", "Jane"]);
    assert!(team.iter().all(|m| m.status == Presence::Online));
}

#[tokio::test]
async fn test_list_state_reload() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;

    let mut projects = ProjectListState::new();
    assert!(projects.reload(&h.access, &jane).await);
    assert!(projects.items.is_empty());
    assert!(projects.error.is_none());

    let project = h.access.create_project(&jane, roadmap(vec![])).await.ok().unwrap();
    assert!(projects.reload(&h.access, &jane).await);
    assert_eq!(projects.items.len(), 1);

    let mut tasks = TaskListState::new();
    h.access
        .create_task(
            &jane,
            new_task("Mine", project.project.id, jane.user_id, TaskPriority::Low),
        )
        .await
        .ok()
        .unwrap();
    assert!(tasks.reload(&h.access, &jane).await);
    assert_eq!(tasks.items.len(), 1);
    assert!(!tasks.loading);
}

#[tokio::test]
async fn test_outcome_into_items() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;

    let outcome: Outcome<_> = h.access.get_my_tasks(&jane).await;
    assert!(outcome.into_items().unwrap().is_empty());
}

#[tokio::test]
async fn test_assignment_and_membership_notify() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;
    let bob = h.user("Bob", "Smith", "Developer").await;
    let eve = h.user("Eve", "Stone", "Analyst").await;

    let project = h
        .access
        .create_project(&jane, roadmap(vec![bob.user_id]))
        .await
        .ok()
        .unwrap();
    let id = project.project.id;

    h.access
        .add_team_member_to_project(&jane, id, eve.user_id)
        .await
        .ok()
        .unwrap();
    h.access
        .create_task(&jane, new_task("Draft Q1 goals", id, bob.user_id, TaskPriority::High))
        .await
        .ok()
        .unwrap();
    h.access
        .create_task(&jane, new_task("Self-assigned", id, jane.user_id, TaskPriority::Low))
        .await
        .ok()
        .unwrap();

    let feed = h.access.get_notifications(&bob).await.ok().unwrap();
    let kinds: Vec<_> = feed.iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::Task, NotificationKind::Team]);
    assert_eq!(feed[0].priority, Some(TaskPriority::High));
    assert!(feed.iter().all(|n| !n.read && n.user_id == bob.user_id));

    let feed = h.access.get_notifications(&eve).await.ok().unwrap();
    assert_eq!(feed.len(), 1);
    assert!(feed[0].message.contains("Roadmap"));

    // No notification for assigning yourself
    assert!(h.access.get_notifications(&jane).await.is_empty());
}

#[tokio::test]
async fn test_notification_changes_are_owner_only() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;
    let bob = h.user("Bob", "Smith", "Developer").await;

    let project = h.access.create_project(&jane, roadmap(vec![])).await.ok().unwrap();
    let id = project.project.id;
    h.access
        .add_team_member_to_project(&jane, id, bob.user_id)
        .await
        .ok()
        .unwrap();
    for name in ["Outline", "Build"] {
        h.access
            .create_task(&jane, new_task(name, id, bob.user_id, TaskPriority::Medium))
            .await
            .ok()
            .unwrap();
    }

    let feed = h.access.get_notifications(&bob).await.ok().unwrap();
    assert_eq!(feed.len(), 3);
    let first = feed[0].id;

    assert!(h.access.mark_notification_read(&jane, first).await.is_empty());
    assert!(h.access.delete_notification(&jane, first).await.is_empty());
    assert_eq!(h.access.mark_all_notifications_read(&jane).await.ok(), Some(0));

    let read = h.access.mark_notification_read(&bob, first).await.ok().unwrap();
    assert!(read.read);
    assert_eq!(h.access.mark_all_notifications_read(&bob).await.ok(), Some(2));
    assert_eq!(h.access.mark_all_notifications_read(&bob).await.ok(), Some(0));

    let deleted = h.access.delete_notification(&bob, first).await.ok().unwrap();
    assert_eq!(deleted.id, first);
    assert!(h.access.delete_notification(&bob, first).await.is_empty());

    let mut state = NotificationListState::new();
    assert!(state.reload(&h.access, &bob).await);
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.unread_count(), 0);
}

#[tokio::test]
async fn test_task_comments_follow_project_roles() {
    let h = Harness::new();
    let jane = h.user("Jane", "Doe", "Product Manager").await;
    let bob = h.user("Bob", "Smith", "Developer").await;
    let vic = h.user("Vic", "Reyes", "Designer").await;
    let eve = h.user("Eve", "Stone", "Analyst").await;

    let project = h
        .access
        .create_project(&jane, roadmap(vec![bob.user_id]))
        .await
        .ok()
        .unwrap();
    let id = project.project.id;
    h.store
        .create_membership(CreateMembership {
            project_id: id,
            user_id: vic.user_id,
            role: MembershipRole::Viewer,
        })
        .await
        .unwrap();

    let task = h
        .access
        .create_task(&jane, new_task("Wireframes", id, bob.user_id, TaskPriority::Medium))
        .await
        .ok()
        .unwrap();

    let comment = |content: &str| NewComment {
        content: content.to_string(),
    };

    assert!(h.access.get_task_comments(&jane, task.id).await.is_empty());

    let first = h
        .access
        .add_task_comment(&bob, task.id, comment(" First pass is up. "))
        .await
        .ok()
        .unwrap();
    assert_eq!(first.content, "First pass is up.");
    assert_eq!(first.author_name, "Bob Smith");
    h.access
        .add_task_comment(&jane, task.id, comment("Looks good."))
        .await
        .ok()
        .unwrap();

    // Viewers read but cannot write
    let thread = h.access.get_task_comments(&vic, task.id).await.ok().unwrap();
    let authors: Vec<_> = thread.iter().map(|c| c.author_id).collect();
    assert_eq!(authors, vec![bob.user_id, jane.user_id]);

    let refused = h.access.add_task_comment(&vic, task.id, comment("Hi")).await;
    assert!(matches!(refused.failure(), Some(AccessError::Forbidden(_))));

    // Outsiders see nothing and cannot tell the task exists
    assert!(h.access.get_task_comments(&eve, task.id).await.is_empty());
    let hidden = h.access.add_task_comment(&eve, task.id, comment("Hi")).await;
    assert!(matches!(hidden.failure(), Some(AccessError::NotFound(_))));

    let missing = h
        .access
        .add_task_comment(&jane, Uuid::new_v4(), comment("Hi"))
        .await;
    assert!(matches!(missing.failure(), Some(AccessError::NotFound(_))));

    let blank = h.access.add_task_comment(&jane, task.id, comment("   ")).await;
    assert!(matches!(blank.failure(), Some(AccessError::Validation(_))));
}
