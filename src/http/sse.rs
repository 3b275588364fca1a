//! `GET /events`: pushes the current snapshot immediately, then one
//! snapshot every tick period, aligned with the physics tick. Because each
//! iteration reads whatever the shared state currently holds rather than
//! draining a queue, a slow subscriber simply misses intermediate
//! snapshots instead of building up backlog, dropping events for slow
//! consumers without any extra bookkeeping.

use std::sync::Arc;
use std::time::Duration;

use rocket::futures::stream::Stream;
use rocket::response::stream::{Event, EventStream};
use rocket::{get, Shutdown, State};
use tokio::sync::RwLock;
use tokio::time::interval;

use super::dto::SnapshotDto;
use crate::state::SimState;

#[get("/events")]
pub fn events(
    state: &State<Arc<RwLock<SimState>>>,
    tick_period: &State<Duration>,
    mut shutdown: Shutdown,
) -> EventStream<impl Stream<Item = Event>> {
    let state = Arc::clone(state.inner());
    let period = *tick_period.inner();

    EventStream! {
        let snap = state.read().await.clone();
        yield Event::json(&SnapshotDto::from(&snap));

        let mut ticker = interval(period);
        ticker.tick().await; // the first tick fires immediately; already emitted above

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snap = state.read().await.clone();
                    yield Event::json(&SnapshotDto::from(&snap));
                }
                _ = &mut shutdown => {
                    yield Event::data("bye");
                    break;
                }
            }
        }
    }
}
