//! Drives a login form through a failed, an overlapping and a successful
//! submission. Run with `RUST_LOG=debug` to see the wrapper's diagnostics.
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use handle_loading::log_error;
use handle_loading::prelude::*;

#[derive(Debug, Default)]
struct LoginForm {
    user: String,
    loading: bool,
    server_error: Option<Alert>,
}

type Host = Rc<RefCell<LoginForm>>;

async fn post_login(form: Host, attempt: u32) -> Result<(), String> {
    let user = form.borrow().user.clone();
    log::info!("posting login for {user} (attempt {attempt})");
    tokio::time::sleep(Duration::from_millis(50)).await;
    if attempt == 1 {
        Err("network down".to_owned())
    } else {
        Ok(())
    }
}

fn print_form(stage: &str, form: &Host) {
    let form = form.borrow();
    match &form.server_error {
        Some(alert) => println!(
            "{stage}: loading={} alert #{} [{}] {}",
            form.loading,
            alert.id(),
            alert.alert_type(),
            alert.text()
        ),
        None => println!("{stage}: loading={} no alert", form.loading),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let submit = HandleLoading::new(|f: &LoginForm| f.loading, |f, v| f.loading = v)
        .error_field(|f, alert| f.server_error = alert)
        .name("submit_login")
        .wrap(post_login);

    let form: Host = Rc::new(RefCell::new(LoginForm {
        user: "alice".to_owned(),
        ..Default::default()
    }));

    let _ = submit.call(&form, 1).await;
    print_form("first attempt", &form);

    // The second click lands while the first one is still in flight
    let (first, second) = tokio::join!(submit.call(&form, 2), submit.call(&form, 3));
    println!("overlapping clicks: {first:?} / {second:?}");
    print_form("second attempt", &form);

    let ping = HandleLoading::new(|f: &LoginForm| f.loading, |f, v| f.loading = v).name("ping");
    if let Err(e) = ping
        .run(&form, |_| async { Err::<(), _>("no one to tell") })
        .await
        .map_err(log_error)
    {
        println!("unbound error target: {e}");
    }
}
