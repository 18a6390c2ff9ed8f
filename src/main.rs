use pmtrack::cli::{internal_error, is_internal, run, user_error};

fn main() {
    if let Err(e) = run() {
        // Show the full cause chain on a single line
        let message = format!("{:#}", e);
        if is_internal(&e) {
            internal_error(&message);
        } else {
            user_error(&message);
        }
    }
}
