/// WebSocket session forwarding post mutation events to one client.
use actix::{Actor, ActorContext, AsyncContext, Handler, Message as ActixMessage, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;

use super::{PostBroadcaster, SubscriberId};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

// Serialized event forwarded from the broadcaster
#[derive(ActixMessage)]
#[rtype(result = "()")]
struct BroadcastMessage(String);

struct PostsWsSession {
    subscriber_id: SubscriberId,
    broadcaster: PostBroadcaster,
    // Taken when the actor starts
    receiver: Option<UnboundedReceiver<String>>,
    hb: Instant,
}

impl PostsWsSession {
    fn new(
        subscriber_id: SubscriberId,
        broadcaster: PostBroadcaster,
        receiver: UnboundedReceiver<String>,
    ) -> Self {
        Self {
            subscriber_id,
            broadcaster,
            receiver: Some(receiver),
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                tracing::warn!("WebSocket heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for PostsWsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("posts WebSocket session started ({:?})", self.subscriber_id);

        self.hb(ctx);

        // Forward broadcast frames into the actor. The loop ends when
        // unsubscribe drops the sending half in stopped().
        if let Some(mut receiver) = self.receiver.take() {
            let addr = ctx.address();
            actix::spawn(async move {
                while let Some(payload) = receiver.recv().await {
                    addr.do_send(BroadcastMessage(payload));
                }
            });
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("posts WebSocket session stopped ({:?})", self.subscriber_id);

        let broadcaster = self.broadcaster.clone();
        let subscriber_id = self.subscriber_id;
        actix::spawn(async move {
            broadcaster.unsubscribe(subscriber_id).await;
        });
    }
}

impl Handler<BroadcastMessage> for PostsWsSession {
    type Result = ();

    fn handle(&mut self, msg: BroadcastMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for PostsWsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(_)) => {
                // The posts channel is broadcast-only
            }
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!("binary WebSocket messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!("WebSocket close received: {:?}", reason);
                ctx.stop();
            }
            _ => {}
        }
    }
}

/// `GET /ws/posts` — upgrade and subscribe to mutation events.
pub async fn posts_ws(
    req: HttpRequest,
    stream: web::Payload,
    broadcaster: web::Data<PostBroadcaster>,
) -> Result<HttpResponse, Error> {
    let (subscriber_id, receiver) = broadcaster.subscribe().await;
    let session = PostsWsSession::new(subscriber_id, broadcaster.get_ref().clone(), receiver);

    ws::start(session, &req, stream)
}
