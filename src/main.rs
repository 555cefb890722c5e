//! Headless client: joins a game, follows the event feed, and drives
//! plays from a line-based console.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use sabueso_client::api::{ApiClient, CommandApi};
use sabueso_client::config::Config;
use sabueso_client::play::PlayOptions;
use sabueso_client::{
    telemetry, ActionStack, AlertSink, CardActions, EventBus, GameStore, Session, TracingAlert,
    WsTransport,
};

const HELP: &str = "Comandos: iniciar | estado | sel <idCarta> | jugar [objetivo] [cantidad] | \
mover <origen> <secreto> <destino> | set <idCarta> <idSet> | responder <idCarta> | \
robar | descartar | revelar <idSecreto> | ocultar <idSecreto> | \
robar-secreto <objetivo> <idSecreto> | terminar | salir";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let config = Config::from_env();

    let api = Arc::new(ApiClient::new(&config.server_url));
    let session = Arc::new(Session::new());

    let game_id = match config.game_id {
        Some(id) => id,
        None => {
            let id = api
                .crear_partida(&config.player_name)
                .await
                .context("no se pudo crear la partida")?;
            info!(partida = id, "partida creada");
            id
        }
    };
    let player_id = api
        .unirse_partida(game_id, &config.player_name)
        .await
        .context("no se pudo entrar en la partida")?;
    session.set(game_id, player_id);
    info!(
        partida = game_id,
        jugador = player_id,
        nombre = %config.player_name,
        "sesión establecida"
    );

    let alert: Arc<dyn AlertSink> = Arc::new(TracingAlert);
    let bus = Arc::new(EventBus::new());
    let store = GameStore::new(session.clone());
    let stack = ActionStack::new(api.clone(), session.clone(), alert.clone());
    let actions = CardActions::new(
        api.clone(),
        stack.clone(),
        store.clone(),
        session.clone(),
        alert.clone(),
    );
    let _stack_subs = stack.bind(&bus);
    let _store_subs = store.bind(&bus);

    let transport = WsTransport::connect(&config.ws_url(game_id, player_id), bus.clone())
        .await
        .context("no se pudo conectar el transporte de eventos")?;

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("cierre solicitado");
                break;
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim() == "iniciar" => {
                        if let Err(err) = api.iniciar_partida(game_id).await {
                            alert.alert(&err.to_string());
                        }
                    }
                    Some(line) => {
                        if !dispatch(line.trim(), &actions, &store, &stack).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    transport.disconnect();
    let _ = api.abandonar_partida(game_id, player_id).await;
    Ok(())
}

fn arg_i64(args: &[&str], index: usize) -> Option<i64> {
    args.get(index).and_then(|raw| raw.parse().ok())
}

fn find_in_hand(store: &GameStore, card_instance_id: i64) -> Option<sabueso_client::game::HandCard> {
    store.view().hand.into_iter().find(|c| c.id == card_instance_id)
}

/// Returns false when the loop should exit.
async fn dispatch<C: CommandApi>(
    line: &str,
    actions: &CardActions<C>,
    store: &GameStore,
    stack: &ActionStack<C>,
) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&command, args)) = tokens.split_first() else {
        return true;
    };

    match command {
        "estado" => {
            println!("{:#?}", store.view());
            match stack.pending() {
                Some(pending) => println!(
                    "acción pendiente: {} (jugador {}, {} respuestas)",
                    pending.display_card.name,
                    pending.actor_id,
                    pending.response_stack.len()
                ),
                None => println!("sin acción pendiente"),
            }
            if let Some(message) = stack.result_message() {
                println!("última resolución: {message}");
            }
        }
        "sel" => match arg_i64(args, 0) {
            Some(id) => store.toggle_selection(id),
            None => println!("uso: sel <idCarta>"),
        },
        "jugar" => {
            let options = PlayOptions {
                target: arg_i64(args, 0),
                cantidad: args.get(1).and_then(|raw| raw.parse().ok()),
            };
            actions.play_selection(options).await;
        }
        "mover" => {
            let (Some(source), Some(secret), Some(destination)) =
                (arg_i64(args, 0), arg_i64(args, 1), arg_i64(args, 2))
            else {
                println!("uso: mover <origen> <secreto> <destino>");
                return true;
            };
            actions.choose_source_player(source);
            actions.choose_secret(secret);
            actions.choose_destination_player(destination).await;
        }
        "set" => {
            let (Some(card_id), Some(set_id)) = (arg_i64(args, 0), arg_i64(args, 1)) else {
                println!("uso: set <idCarta> <idSet>");
                return true;
            };
            match find_in_hand(store, card_id) {
                Some(card) => actions.add_card_to_set(card, set_id).await,
                None => println!("esa carta no está en la mano"),
            }
        }
        "responder" => match arg_i64(args, 0).and_then(|id| find_in_hand(store, id)) {
            Some(card) => actions.respond_not_so_fast(card).await,
            None => println!("uso: responder <idCarta en mano>"),
        },
        "robar" => actions.draw_card().await,
        "descartar" => actions.discard_selected().await,
        "revelar" => match arg_i64(args, 0) {
            Some(id) => actions.reveal_secret(id).await,
            None => println!("uso: revelar <idSecreto>"),
        },
        "ocultar" => match arg_i64(args, 0) {
            Some(id) => actions.hide_secret(id).await,
            None => println!("uso: ocultar <idSecreto>"),
        },
        "robar-secreto" => {
            let (Some(target), Some(secret)) = (arg_i64(args, 0), arg_i64(args, 1)) else {
                println!("uso: robar-secreto <objetivo> <idSecreto>");
                return true;
            };
            actions.rob_secret(target, secret).await;
        }
        "terminar" => actions.end_turn().await,
        "salir" => return false,
        _ => println!("{HELP}"),
    }
    true
}
