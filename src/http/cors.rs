//! Permissive CORS fairing so a browser dashboard hosted on a different
//! origin can reach `/events`, `/sync`, and `/reset_damage`.

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Request, Response};

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(
            Header::new("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        );
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}
