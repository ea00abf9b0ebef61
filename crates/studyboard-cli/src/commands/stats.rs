use crate::render;
use crate::session::Session;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let dashboard = session.tracker.dashboard();

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        println!("{}", render::dashboard(&dashboard));
        if let Some(last) = studyboard_core::view::last_activity(session.tracker.subjects()) {
            let now = session.tracker.clock().now();
            println!(
                "Last activity: {}",
                studyboard_core::view::format_relative(last, now)
            );
        }
    }
    Ok(())
}
