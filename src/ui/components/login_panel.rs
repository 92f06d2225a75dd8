use eframe::egui;

use crate::common::BackendCommand;
use crate::ui::state::LoginForm;

/// Draw the login / registration form. Returns the auth command to
/// dispatch when the user submits valid input.
pub fn render(ui: &mut egui::Ui, form: &mut LoginForm) -> Option<BackendCommand> {
    let mut submit = false;

    ui.vertical_centered(|ui| {
        ui.add_space(48.0);
        ui.heading("Chat Room");
        ui.add_space(16.0);

        ui.add_enabled_ui(!form.pending, |ui| {
            egui::Grid::new("login_fields")
                .num_columns(2)
                .spacing([8.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Email");
                    ui.text_edit_singleline(&mut form.email);
                    ui.end_row();

                    ui.label("Password");
                    ui.add(egui::TextEdit::singleline(&mut form.password).password(true));
                    ui.end_row();

                    if form.registering {
                        ui.label("Username");
                        ui.text_edit_singleline(&mut form.username);
                        ui.end_row();
                    }
                });

            ui.add_space(8.0);
            ui.checkbox(&mut form.registering, "Create a new account");
            ui.add_space(8.0);

            let label = if form.registering { "Sign Up" } else { "Sign In" };
            if ui.button(label).clicked() {
                submit = true;
            }
        });

        if form.pending {
            ui.add_space(8.0);
            ui.spinner();
        }

        if let Some(error) = &form.error {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::LIGHT_RED, error);
        }
    });

    if submit { submission(form) } else { None }
}

/// Build the auth command, refusing blank credentials locally; the
/// backend judges everything else.
fn submission(form: &LoginForm) -> Option<BackendCommand> {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return None;
    }

    if form.registering {
        let username = form.username.trim();
        if username.is_empty() {
            return None;
        }
        Some(BackendCommand::SignUp {
            email: email.to_string(),
            password: form.password.clone(),
            username: username.to_string(),
        })
    } else {
        Some(BackendCommand::SignIn {
            email: email.to_string(),
            password: form.password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
            ..LoginForm::default()
        }
    }

    #[test]
    fn blank_credentials_do_not_submit() {
        assert!(submission(&form("", "secret")).is_none());
        assert!(submission(&form("a@example.co", "")).is_none());
        assert!(submission(&form("   ", "secret")).is_none());
    }

    #[test]
    fn sign_in_uses_trimmed_email() {
        let command = submission(&form(" a@example.co ", "secret")).unwrap();
        match command {
            BackendCommand::SignIn { email, password } => {
                assert_eq!(email, "a@example.co");
                assert_eq!(password, "secret");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn registration_requires_a_username() {
        let mut form = form("a@example.co", "secret");
        form.registering = true;
        assert!(submission(&form).is_none());

        form.username = "alice".to_string();
        assert!(matches!(
            submission(&form),
            Some(BackendCommand::SignUp { .. })
        ));
    }
}
