//! Placeholder console pages. The real console is served by a separate
//! frontend; these shells only give the route guard something to protect.

use axum::response::Html;

const LOGIN_PAGE: &str = "<!doctype html>\n<html><head><title>Admin login</title></head>\
<body><main id=\"login\"></main></body></html>\n";

const SETUP_PAGE: &str = "<!doctype html>\n<html><head><title>Admin setup</title></head>\
<body><main id=\"setup\"></main></body></html>\n";

const DASHBOARD_PAGE: &str = "<!doctype html>\n<html><head><title>Blacklist dashboard</title></head>\
<body><main id=\"dashboard\"></main></body></html>\n";

pub async fn login() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

pub async fn setup() -> Html<&'static str> {
    Html(SETUP_PAGE)
}

pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}
