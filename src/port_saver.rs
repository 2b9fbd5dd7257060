use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket};
use tokio::sync::watch;

/// Pairs a liftoff fairing with a handle that learns the port the server actually bound.
pub fn create_pair() -> (PortSaver, Port) {
    let (sender, receiver) = watch::channel(None);
    (PortSaver { sender }, Port { receiver })
}

pub struct Port {
    receiver: watch::Receiver<Option<u16>>,
}

impl Port {
    /// Waits for liftoff. `None` if the server was dropped before it bound a port.
    pub async fn get(&self) -> Option<u16> {
        let mut receiver = self.receiver.clone();
        let port = receiver.wait_for(Option::is_some).await.ok()?;
        *port
    }
}

pub struct PortSaver {
    sender: watch::Sender<Option<u16>>,
}

#[rocket::async_trait]
impl Fairing for PortSaver {
    fn info(&self) -> Info {
        Info {
            name: "Bound port",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let port = rocket.config().port;
        tracing::info!(port, "Server is listening");
        self.sender.send_replace(Some(port));
    }
}
