/// Commands the UI sends down to the backend task.
#[derive(Debug, Clone)]
pub enum BackendCommand {
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        email: String,
        password: String,
        username: String,
    },
    SendMessage {
        content: String,
    },
    SignOut,
}
