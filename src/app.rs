use std::{
    io::BufRead,
    sync::{
        mpsc::{self, Receiver},
        Arc,
    },
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;

use crate::{
    backend::{self, RestBackend},
    cli::{Cli, Command},
    domain::{
        self,
        conversation_list_state::ConversationFilter,
        events::GlobalAction,
        message::voice_note_content,
        profile::ProfileUpdate,
        search::{MessageSearch, SearchFilter},
        self_destruct,
    },
    infra::{self, config::AppConfig},
    summary_service::{self, completion::GatewayClient, ServiceState},
    ui::{
        self,
        compose_input::{self, ComposeLine},
        conversation_rendering, message_rendering, profile_rendering, summary_rendering,
    },
    usecases::{
        self, bootstrap,
        compose::{ComposeEvent, ComposeSession},
        context::AppContext,
        contracts::Backend,
        create_conversation::CreateConversationCommand,
        profile,
        summarize::{build_request, summarize},
        workspace::{DataSource, Workspace},
    },
};

const LIST_WIDTH: usize = 100;

const WATCH_STARTED: &str = "WATCH_STARTED";
const WATCH_FEED_CLOSED: &str = "WATCH_FEED_CLOSED";

pub fn run(cli: Cli) -> Result<()> {
    let (context, _log_guard) = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        backend = backend::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    match cli.command_or_default() {
        Command::ServeSummary => serve_summary(&context.config),
        Command::Profile {
            display_name,
            username,
            status,
            bio,
        } => {
            let backend = RestBackend::new(&context.config.backend)?;
            let update = ProfileUpdate {
                username,
                display_name,
                avatar_url: None,
                bio,
                status,
            };
            show_or_update_profile(&backend, &context, &update)
        }
        Command::People => {
            let backend = RestBackend::new(&context.config.backend)?;
            print_lines(profile_rendering::render_directory(&profile::list_profiles(
                &backend,
            )));
            Ok(())
        }
        command => {
            let backend = Arc::new(RestBackend::new(&context.config.backend)?);
            let (notifications_tx, notifications_rx) = mpsc::channel();
            let mut workspace = Workspace::new(
                Arc::clone(&backend),
                context.session.clone(),
                context.config.demo.clone(),
                notifications_tx,
            );
            let source = workspace.load_conversations(Utc::now());
            tracing::info!(source = source.as_str(), "conversation list loaded");

            match command {
                Command::Summarize { conversation_id } => {
                    open_known(&mut workspace, &conversation_id)?;
                    summarize_conversation(&workspace, backend.as_ref(), &context.config)
                }
                Command::Watch { conversation_id } => {
                    watch(&mut workspace, &notifications_rx, &conversation_id)
                }
                Command::Compose { conversation_id } => {
                    compose(&mut workspace, &conversation_id, std::io::stdin().lock())
                }
                command => dispatch(&mut workspace, command),
            }
        }
    }
}

/// Commands that only need the workspace.
fn dispatch<B: Backend + ?Sized>(workspace: &mut Workspace<B>, command: Command) -> Result<()> {
    match command {
        Command::Conversations { query, filter } => {
            if let Some(raw) = filter {
                let filter = ConversationFilter::parse(&raw)
                    .ok_or_else(|| anyhow!("unknown conversation filter `{raw}`"))?;
                workspace.list_mut().set_filter(filter);
            }
            if let Some(query) = query {
                workspace.list_mut().set_query(query);
            }
            if workspace.source() == DataSource::Demo {
                println!("(demo data)");
            }
            print_conversation_list(workspace);
        }
        Command::Messages { conversation_id } => {
            open_known(workspace, &conversation_id)?;
            print_thread(workspace, None);
        }
        Command::Send {
            conversation_id,
            content,
            reply_to,
            self_destruct: timer,
        } => {
            let timer = timer.map(self_destruct::check).transpose()?;
            open_known(workspace, &conversation_id)?;
            let message =
                workspace.send_message(&content, reply_to.as_deref(), timer, Utc::now())?;
            match timer.and_then(|seconds| self_destruct::option_label(Some(seconds))) {
                Some(label) => println!("sent {} (self-destruct: {label})", message.id),
                None => println!("sent {}", message.id),
            }
        }
        Command::Voice {
            conversation_id,
            duration_secs,
        } => {
            open_known(workspace, &conversation_id)?;
            let content = voice_note_content(duration_secs);
            let message = workspace.send_message(&content, None, None, Utc::now())?;
            println!("sent {} {}", message.id, message.content);
        }
        Command::React {
            conversation_id,
            message_id,
            emoji,
        } => {
            open_known(workspace, &conversation_id)?;
            workspace.add_reaction(&message_id, &emoji);
            print_thread(workspace, Some(&message_id));
        }
        Command::Bookmark {
            conversation_id,
            message_id,
        } => {
            open_known(workspace, &conversation_id)?;
            match workspace.toggle_bookmark(&message_id) {
                Some(true) => println!("bookmarked {message_id}"),
                Some(false) => println!("bookmark removed from {message_id}"),
                None => bail!("message {message_id} not found in conversation {conversation_id}"),
            }
        }
        Command::Create {
            kind,
            name,
            members,
        } => {
            let conversation = workspace.create_conversation(
                CreateConversationCommand {
                    kind: kind.into(),
                    name,
                    member_ids: members,
                },
                Utc::now(),
            )?;
            println!(
                "created {} {} ({})",
                conversation.kind.as_str(),
                conversation.title_for(workspace.viewer_id()),
                conversation.id
            );
        }
        Command::Search {
            conversation_id,
            query,
            filter,
            next,
            previous,
        } => {
            let filter = SearchFilter::parse(&filter)
                .ok_or_else(|| anyhow!("unknown search filter `{filter}`"))?;
            open_known(workspace, &conversation_id)?;
            let mut search = MessageSearch::run(workspace.messages(), &query, filter);
            if search.results().is_empty() {
                println!("no matches for \"{query}\"");
                return Ok(());
            }
            step_search(&mut search, next, previous);
            println!(
                "{} match(es), showing {}",
                search.results().len(),
                search.current().unwrap_or_default()
            );
            for message in workspace
                .messages()
                .iter()
                .filter(|message| search.results().contains(&message.id))
            {
                println!("  {}: {}", message.id, message.content);
            }
            println!();
            print_thread(workspace, search.current());
        }
        other @ (Command::Watch { .. }
        | Command::Compose { .. }
        | Command::Summarize { .. }
        | Command::Profile { .. }
        | Command::People
        | Command::ServeSummary) => {
            bail!("{other:?} needs the live backend and cannot run on a workspace alone")
        }
    }

    Ok(())
}

fn open_known<B: Backend + ?Sized>(workspace: &mut Workspace<B>, conversation_id: &str) -> Result<()> {
    if workspace.conversation(conversation_id).is_none() {
        bail!("unknown conversation `{conversation_id}`");
    }
    workspace.open_conversation(conversation_id);
    Ok(())
}

/// Moves the search cursor; both directions wrap around.
fn step_search(search: &mut MessageSearch, next: usize, previous: usize) {
    for _ in 0..next {
        search.next();
    }
    for _ in 0..previous {
        search.previous();
    }
}

fn print_conversation_list<B: Backend + ?Sized>(workspace: &Workspace<B>) {
    print_lines(conversation_rendering::render_conversation_list(
        workspace.list(),
        workspace.viewer_id(),
        Utc::now(),
        LIST_WIDTH,
    ));
}

fn print_thread<B: Backend + ?Sized>(workspace: &Workspace<B>, highlighted: Option<&str>) {
    let viewer_id = workspace.viewer_id();
    if let Some(conversation) = workspace
        .active_conversation()
        .and_then(|id| workspace.conversation(id))
    {
        println!("== {} ==", conversation.title_for(viewer_id));
    }
    print_lines(message_rendering::render_thread(
        workspace.messages(),
        viewer_id,
        highlighted,
    ));
}

/// Prints the thread, then reprints it every time the change feed reports a
/// change for it. Runs until interrupted.
fn watch<B: Backend + ?Sized>(
    workspace: &mut Workspace<B>,
    notifications: &Receiver<domain::events::ChangeNotification>,
    conversation_id: &str,
) -> Result<()> {
    open_known(workspace, conversation_id)?;
    print_thread(workspace, None);

    if workspace.source() == DataSource::Demo {
        println!("(demo data has no live updates)");
        return Ok(());
    }

    tracing::info!(code = WATCH_STARTED, conversation_id, "watching conversation");
    while let Ok(notification) = notifications.recv() {
        if workspace.handle_notification(&notification) {
            println!();
            print_thread(workspace, None);
        }
    }
    tracing::info!(code = WATCH_FEED_CLOSED, conversation_id, "change feed closed");

    Ok(())
}

/// Feeds stdin lines to a composer session on `conversation_id` until EOF
/// or `/close`, then closes the conversation.
fn compose<B: Backend + ?Sized>(
    workspace: &mut Workspace<B>,
    conversation_id: &str,
    input: impl BufRead,
) -> Result<()> {
    open_known(workspace, conversation_id)?;
    print_thread(workspace, None);
    println!("(end a line with \\ to continue it; /reply <id>, /timer <off|seconds>, ^k, /close)");

    let mut session = ComposeSession::default();
    for line in input.lines() {
        let line = line.context("failed to read composer input")?;
        match compose_input::parse_line(&line) {
            ComposeLine::Close => break,
            ComposeLine::Reply(Some(message_id)) => {
                if session.set_reply_target(workspace.messages(), &message_id) {
                    println!("replying to {message_id}");
                } else {
                    println!("message {message_id} is not in this conversation");
                }
            }
            ComposeLine::Reply(None) => {
                session.clear_reply_target();
                println!("reply cleared");
            }
            ComposeLine::Timer(raw) => match session.set_timer(&raw) {
                Ok(seconds) => println!(
                    "self-destruct: {}",
                    self_destruct::option_label(seconds).unwrap_or_default()
                ),
                Err(error) => println!("{error}"),
            },
            ComposeLine::Keys(keys) => {
                for key in &keys {
                    match session.handle_key(workspace, key, Utc::now()) {
                        ComposeEvent::Sent(message) => println!("sent {}", message.id),
                        ComposeEvent::SendFailed(error) => println!("send failed: {error}"),
                        ComposeEvent::Global(GlobalAction::OpenCommandPalette) => {
                            print_conversation_list(workspace)
                        }
                        ComposeEvent::Edited | ComposeEvent::Ignored => {}
                    }
                }
                if !session.composer().is_empty() {
                    println!("draft: {}", compose_input::render_draft(session.composer()));
                }
            }
        }
    }

    if !session.composer().is_empty() {
        println!("draft discarded");
    }
    workspace.close_conversation();
    Ok(())
}

fn summarize_conversation<B: Backend + ?Sized>(
    workspace: &Workspace<B>,
    backend: &RestBackend,
    config: &AppConfig,
) -> Result<()> {
    let title = workspace
        .active_conversation()
        .and_then(|id| workspace.conversation(id))
        .map(|conversation| conversation.title_for(workspace.viewer_id()))
        .unwrap_or_default();

    let request = build_request(workspace.messages(), &title, config.summary.max_messages);
    let view = summarize(backend, &config.summary.function_name, &request);

    println!("== Summary: {title} ==");
    print_lines(summary_rendering::render_summary(&view));
    if view.is_failure() {
        bail!("summary for {title} is unavailable");
    }
    Ok(())
}

fn show_or_update_profile(
    backend: &RestBackend,
    context: &AppContext,
    update: &ProfileUpdate,
) -> Result<()> {
    if !context.session.is_signed_in() {
        bail!("backend.user_id is not configured; sign in first");
    }
    let user_id = context.session.user_id.as_str();

    let profile = if update.is_empty() {
        profile::load_profile(backend, user_id)
            .with_context(|| format!("profile {user_id} could not be loaded"))?
    } else {
        profile::update_profile(backend, user_id, update)?
    };

    print_lines(profile_rendering::render_profile(&profile, Utc::now()));
    Ok(())
}

fn serve_summary(config: &AppConfig) -> Result<()> {
    let service_config = &config.summary_service;
    let client = GatewayClient::new(service_config.upstream_url.clone())?;
    let state = ServiceState::from_env(client, service_config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("nova-summary")
        .build()?;
    runtime.block_on(summary_service::serve(service_config, state))
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
