use leptos::prelude::*;
use minddock::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}
