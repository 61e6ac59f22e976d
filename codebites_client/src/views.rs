//! Plain-text renderings for the terminal.

use crate::{
    api::{Question, User},
    form::{Field, FormSession},
    notify::Notification,
};

const PASSWORD_MASK: char = '*';

pub fn form(form: &FormSession) -> String {
    let mut out = format!("{}\n", form.kind().title());
    for field in form.kind().fields() {
        let value = form.values().get(*field);
        let shown = match field {
            Field::Password => PASSWORD_MASK.to_string().repeat(value.chars().count()),
            _ => value.to_owned(),
        };
        out.push_str(&format!("  {:<9} {}\n", field.name(), shown));
    }
    out.push_str(&rules(form));
    out.push_str(&format!(
        "\n  submit {}",
        if form.can_submit() { "enabled" } else { "disabled" }
    ));
    out
}

/// One line per rule of the form's kind, in catalogue order.
pub fn rules(form: &FormSession) -> String {
    form.active_rules()
        .map(|rule| {
            let mark = if rule.valid() { "ok" } else { "!!" };
            format!("  [{}] {}", mark, rule.message())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn message(notification: &Notification) -> String {
    format!("[{}] {}", notification.severity(), notification.text())
}

pub fn users(users: &[User]) -> String {
    let mut out = format!("Number of Users: {}\n", users.len());
    out.push_str(&format!(
        "{:>4}  {:<20} {:<30} {:<6} {:<5}",
        "ID", "USERNAME", "EMAIL", "ACTIVE", "ADMIN"
    ));
    for user in users {
        out.push_str(&format!(
            "\n{:>4}  {:<20} {:<30} {:<6} {:<5}",
            user.id, user.username, user.email, user.active, user.admin
        ));
    }
    out
}

pub fn profile(user: &User) -> String {
    format!(
        "User ID: {}\nUsername: {}\nEmail: {}\nActive: {}\nAdmin: {}",
        user.id, user.username, user.email, user.active, user.admin
    )
}

pub fn questions(questions: &[Question]) -> String {
    let mut out = format!("Number of Questions: {}", questions.len());
    for question in questions {
        let author = question
            .author_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_owned());
        out.push_str(&format!(
            "\n\n#{} by {} ({})\n{}\n  test:     {}\n  solution: {}",
            question.id,
            author,
            question.difficulty,
            question.body,
            question.test_code,
            question.test_solution
        ));
    }
    out
}

pub fn signed_out() -> &'static str {
    "Signed Out. Login at /login."
}

pub fn login_required() -> &'static str {
    "You must be logged in to view this page."
}
