//! Interactive session console.
//!
//! The console owns the one session per process. Commands mutate it in
//! place, registry changes are saved immediately and credentials never
//! outlive the process. A failed command prints its error and the loop
//! continues, the session only changes after a successful exchange.

use anyhow::{bail, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use crate::auth;
use crate::error::Error;
use crate::models::{AlarmInfo, AlarmStatus, Asset, DeviceInfo, PageData, Tenant};
use crate::queries::dashboard::{Overview, TelemetryPoint};
use crate::queries::topology::TopologyNode;
use crate::queries::{self, QueryCache};
use crate::session::{RegistryStore, Session};

use super::commands::print_environments;

const DEFAULT_PAGE_SIZE: u32 = 20;

type ConsoleInput = Lines<BufReader<Stdin>>;

/// Whether the loop keeps going after a command.
enum ConsoleFlow {
    Continue,
    Quit,
}

/// Run the console until `quit` or end of input.
pub async fn run() -> Result<()> {
    let store = RegistryStore::open_default()?;
    let mut session = store.load()?;
    let mut cache = QueryCache::new();

    println!("tbctl console - type `help` for commands, `quit` to leave.");
    if let Some(env) = session.active_environment() {
        println!("Active environment: {} ({})", env.name, env.base_url);
    } else {
        println!("No active environment. Add one with `env add <name> <url>`.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_prompt(&session).await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        match dispatch(&words, &mut session, &mut cache, &store, &mut lines).await {
            Ok(ConsoleFlow::Continue) => {}
            Ok(ConsoleFlow::Quit) => break,
            Err(e) => eprintln!("error: {e}"),
        }
    }

    println!("Bye.");
    Ok(())
}

async fn dispatch(
    words: &[&str],
    session: &mut Session,
    cache: &mut QueryCache,
    store: &RegistryStore,
    lines: &mut ConsoleInput,
) -> Result<ConsoleFlow> {
    match words {
        ["help"] => print_help(),
        ["quit" | "exit"] => return Ok(ConsoleFlow::Quit),
        ["env", rest @ ..] => env_command(rest, session, cache, store)?,
        ["login", rest @ ..] => login_command(rest, session, cache, store, lines).await?,
        ["logout"] => {
            session.logout();
            cache.scope_to(None);
            println!("Logged out.");
        }
        ["whoami"] => whoami(session),
        ["tenants", rest @ ..] => tenants_command(rest, session, cache).await?,
        ["devices", rest @ ..] => devices_command(rest, session, cache).await?,
        ["credentials", device_id] => credentials_command(device_id, session).await?,
        ["assets", rest @ ..] => assets_command(rest, session, cache).await?,
        ["alarms", rest @ ..] => alarms_command(rest, session, cache).await?,
        ["dashboard"] => dashboard_command(session, cache).await?,
        ["topology"] => topology_command(session).await?,
        ["impersonate", tenant_id] => impersonate_command(tenant_id, session, cache).await?,
        ["back"] => back_command(session, cache),
        ["open"] => {
            let env = session
                .active_environment()
                .ok_or(Error::NoActiveEnvironment)?;
            println!("Opening {}", env.base_url);
            open::that(&env.base_url)?;
        }
        _ => println!("Unknown command: {}. Type `help`.", words.join(" ")),
    }
    Ok(ConsoleFlow::Continue)
}

fn print_help() {
    println!("Commands:");
    println!("  env [list]                     List configured environments");
    println!("  env add <name> <url>           Add an environment and make it active");
    println!("  env remove <id>                Remove an environment");
    println!("  env select <id>                Switch environment (forces re-login)");
    println!("  login <username> [password]    Authenticate against the active environment");
    println!("  whoami                         Show the current identity");
    println!("  tenants [page] [search]        List tenants (system administrators)");
    println!("  devices [page] [search] [--type <t>]  List the tenant's devices");
    println!("  credentials <device-id>        Show a device's connectivity credentials");
    println!("  assets [page] [search]         List the tenant's assets");
    println!("  alarms [page] [status]         List alarms (default ACTIVE_UNACK)");
    println!("  dashboard                      Summary statistics for your authority");
    println!("  topology                       Asset containment tree");
    println!("  impersonate <tenant-id>        Act as the tenant's administrator");
    println!("  back                           Return to your original identity");
    println!("  logout                         Drop credentials, keep environments");
    println!("  open                           Open the active environment in a browser");
    println!("  quit                           Leave the console");
}

// === Session commands ===

fn env_command(
    args: &[&str],
    session: &mut Session,
    cache: &mut QueryCache,
    store: &RegistryStore,
) -> Result<()> {
    match args {
        [] | ["list"] => print_environments(session),
        ["add", name, url] => {
            let env = session.add_environment(name, url);
            store.save(session)?;
            // Cached results belong to the previous environment.
            cache.scope_to(None);
            println!("Added environment {} ({})", env.name, env.id);
        }
        ["remove", id] => {
            let known = session.environments().iter().any(|e| e.id == *id);
            session.remove_environment(id);
            store.save(session)?;
            cache.scope_to(session.identity());
            if known {
                println!("Removed environment {id}");
            } else {
                println!("No environment with id {id}");
            }
        }
        ["select", id] => {
            session.select_environment(id)?;
            store.save(session)?;
            cache.scope_to(None);
            println!("Active environment is now {id}. Log in to continue.");
        }
        _ => println!("usage: env [list | add <name> <url> | remove <id> | select <id>]"),
    }
    Ok(())
}

async fn login_command(
    args: &[&str],
    session: &mut Session,
    cache: &mut QueryCache,
    store: &RegistryStore,
    lines: &mut ConsoleInput,
) -> Result<()> {
    let (username, password) = match args {
        [username, password] => ((*username).to_string(), (*password).to_string()),
        [username] => {
            let password = prompt_line(lines, "password: ").await?;
            ((*username).to_string(), password)
        }
        _ => {
            println!("usage: login <username> [password]");
            return Ok(());
        }
    };

    let identity = auth::login(session, &username, &password).await?;
    store.save(session)?;
    cache.scope_to(session.identity());
    println!("Logged in as {} ({})", identity.email, identity.authority);
    Ok(())
}

fn whoami(session: &Session) {
    match session.identity() {
        Some(identity) => {
            println!("{:<14} {}", "email", identity.email);
            println!("{:<14} {}", "authority", identity.authority);
            println!("{:<14} {}", "user id", identity.user_id);
            println!("{:<14} {}", "tenant id", identity.tenant_id);
            println!("{:<14} {}", "customer id", identity.customer_id);
            println!("{:<14} {}", "impersonating", session.is_impersonating());
        }
        None => println!("Not logged in."),
    }
}

async fn impersonate_command(
    tenant_id: &str,
    session: &mut Session,
    cache: &mut QueryCache,
) -> Result<()> {
    let identity = auth::impersonate(session, tenant_id).await?;
    cache.scope_to(session.identity());
    println!(
        "Now acting as {} ({}). Type `back` to return to your own identity.",
        identity.email, identity.authority
    );
    Ok(())
}

fn back_command(session: &mut Session, cache: &mut QueryCache) {
    if session.is_impersonating() {
        session.exit_impersonation();
        cache.scope_to(session.identity());
        let email = session.identity().map_or("-", |i| i.email.as_str());
        println!("Back to {email}.");
    } else {
        println!("Not impersonating.");
    }
}

// === Query commands ===

async fn tenants_command(
    args: &[&str],
    session: &Session,
    cache: &mut QueryCache,
) -> Result<()> {
    let (page, search) = parse_page_and_search(args);
    cache.scope_to(session.identity());

    let key = format!("tenants:{page}:{DEFAULT_PAGE_SIZE}:{search}");
    let data: PageData<Tenant> = match cache.get(&key) {
        Some(hit) => hit,
        None => {
            let fresh = queries::tenants::list(session, page, DEFAULT_PAGE_SIZE, &search).await?;
            cache.put(&key, &fresh);
            fresh
        }
    };

    render_tenants(&data, page);
    Ok(())
}

async fn devices_command(
    args: &[&str],
    session: &Session,
    cache: &mut QueryCache,
) -> Result<()> {
    let (positional, device_type) = extract_type_flag(args);
    let (page, search) = parse_page_and_search(&positional);
    cache.scope_to(session.identity());

    let key = format!(
        "devices:{page}:{DEFAULT_PAGE_SIZE}:{search}:{}",
        device_type.unwrap_or("")
    );
    let data: PageData<DeviceInfo> = match cache.get(&key) {
        Some(hit) => hit,
        None => {
            let fresh =
                queries::devices::list(session, page, DEFAULT_PAGE_SIZE, &search, device_type)
                    .await?;
            cache.put(&key, &fresh);
            fresh
        }
    };

    render_devices(&data, page);
    Ok(())
}

async fn credentials_command(device_id: &str, session: &Session) -> Result<()> {
    let creds = queries::devices::credentials(session, device_id).await?;
    println!("{:<16} {}", "device", creds.device_id.id);
    println!("{:<16} {}", "type", creds.credentials_type);
    println!("{:<16} {}", "credentials id", creds.credentials_id);
    if let Some(value) = &creds.credentials_value {
        println!("{:<16} {}", "value", value);
    }
    Ok(())
}

async fn assets_command(
    args: &[&str],
    session: &Session,
    cache: &mut QueryCache,
) -> Result<()> {
    let (page, search) = parse_page_and_search(args);
    cache.scope_to(session.identity());

    let key = format!("assets:{page}:{DEFAULT_PAGE_SIZE}:{search}");
    let data: PageData<Asset> = match cache.get(&key) {
        Some(hit) => hit,
        None => {
            let fresh = queries::assets::list(session, page, DEFAULT_PAGE_SIZE, &search).await?;
            cache.put(&key, &fresh);
            fresh
        }
    };

    render_assets(&data, page);
    Ok(())
}

async fn alarms_command(
    args: &[&str],
    session: &Session,
    cache: &mut QueryCache,
) -> Result<()> {
    let (page, rest) = parse_page_and_search(args);
    let status = if rest.is_empty() {
        AlarmStatus::ActiveUnack
    } else {
        match AlarmStatus::from_str(&rest) {
            Some(status) => status,
            None => bail!(
                "unknown alarm status: {rest} (try ACTIVE_UNACK, ACTIVE_ACK, CLEARED_UNACK, CLEARED_ACK)"
            ),
        }
    };
    cache.scope_to(session.identity());

    let key = format!("alarms:{page}:{DEFAULT_PAGE_SIZE}:{status}");
    let data: PageData<AlarmInfo> = match cache.get(&key) {
        Some(hit) => hit,
        None => {
            let fresh = queries::alarms::list(session, page, DEFAULT_PAGE_SIZE, status).await?;
            cache.put(&key, &fresh);
            fresh
        }
    };

    render_alarms(&data, page);
    Ok(())
}

async fn dashboard_command(session: &Session, cache: &mut QueryCache) -> Result<()> {
    cache.scope_to(session.identity());

    let overview: Overview = match cache.get("dashboard") {
        Some(hit) => hit,
        None => {
            let fresh = queries::dashboard::overview(session).await?;
            cache.put("dashboard", &fresh);
            fresh
        }
    };

    render_overview(&overview);
    Ok(())
}

async fn topology_command(session: &Session) -> Result<()> {
    let forest = queries::topology::containment_forest(session).await?;
    if forest.is_empty() {
        println!("No assets found.");
        return Ok(());
    }
    for root in &forest {
        print_node(root, 0);
    }
    Ok(())
}

// === Rendering ===

fn render_tenants(data: &PageData<Tenant>, page: u32) {
    if data.data.is_empty() {
        println!("No tenants found.");
        return;
    }
    println!("{:<38} {:<26} {:<28} {}", "ID", "TITLE", "EMAIL", "CREATED");
    println!("{}", "-".repeat(110));
    for tenant in &data.data {
        println!(
            "{:<38} {:<26} {:<28} {}",
            tenant.id.id,
            clip(&tenant.title, 24),
            clip(&tenant.email, 26),
            format_ms(tenant.created_time)
        );
    }
    print_page_footer(page, data);
}

fn render_devices(data: &PageData<DeviceInfo>, page: u32) {
    if data.data.is_empty() {
        println!("No devices found.");
        return;
    }
    println!(
        "{:<38} {:<22} {:<16} {:<18} {:<8} {}",
        "ID", "NAME", "TYPE", "CUSTOMER", "ACTIVE", "CREATED"
    );
    println!("{}", "-".repeat(122));
    for device in &data.data {
        let active = device
            .active
            .map_or("-", |a| if a { "yes" } else { "no" });
        println!(
            "{:<38} {:<22} {:<16} {:<18} {:<8} {}",
            device.id.id,
            clip(&device.name, 20),
            clip(&device.device_type, 14),
            clip(device.customer_title.as_deref().unwrap_or("-"), 16),
            active,
            format_ms(device.created_time)
        );
    }
    print_page_footer(page, data);
}

fn render_assets(data: &PageData<Asset>, page: u32) {
    if data.data.is_empty() {
        println!("No assets found.");
        return;
    }
    println!(
        "{:<38} {:<24} {:<16} {:<16} {}",
        "ID", "NAME", "TYPE", "LABEL", "CREATED"
    );
    println!("{}", "-".repeat(112));
    for asset in &data.data {
        println!(
            "{:<38} {:<24} {:<16} {:<16} {}",
            asset.id.id,
            clip(&asset.name, 22),
            clip(&asset.asset_type, 14),
            clip(asset.label.as_deref().unwrap_or("-"), 14),
            format_ms(asset.created_time)
        );
    }
    print_page_footer(page, data);
}

fn render_alarms(data: &PageData<AlarmInfo>, page: u32) {
    if data.data.is_empty() {
        println!("No alarms found.");
        return;
    }
    println!(
        "{:<14} {:<14} {:<24} {:<20} {}",
        "SEVERITY", "STATUS", "TYPE", "ORIGINATOR", "CREATED"
    );
    println!("{}", "-".repeat(96));
    for alarm in &data.data {
        println!(
            "{:<14} {:<14} {:<24} {:<20} {}",
            alarm.severity,
            alarm.status,
            clip(&alarm.alarm_type, 22),
            clip(alarm.originator_name.as_deref().unwrap_or("-"), 18),
            format_ms(alarm.created_time)
        );
    }
    print_page_footer(page, data);
}

fn render_overview(overview: &Overview) {
    match overview {
        Overview::SysAdmin {
            stats,
            system_info,
            telemetry,
        } => {
            println!("Platform totals");
            println!(
                "  tenants: {}  devices: {}  assets: {}",
                stats.tenants, stats.devices, stats.assets
            );
            println!(
                "  users: {}  customers: {}  tenant profiles: {}",
                stats.users, stats.customers, stats.tenant_profiles
            );
            if let Some(info) = system_info {
                println!("Service {} ({})", info.service_id, info.service_type);
                println!(
                    "  cpu: {:.0}% of {} cores  memory: {:.0}%  disc: {:.0}%",
                    info.cpu_usage, info.cpu_count, info.memory_usage, info.disc_usage
                );
            }
            if !telemetry.is_empty() {
                let total: i64 = telemetry.iter().map(|p| p.value).sum();
                println!("Transport messages over {} days: {total}", telemetry.len());
                println!("  {}", sparkline(telemetry));
            }
        }
        Overview::Tenant {
            tenants,
            devices,
            assets,
            alarm_count,
            active_alarms,
        } => {
            println!("Tenant overview");
            println!(
                "  tenants: {tenants}  devices: {devices}  assets: {assets}  active alarms: {alarm_count}"
            );
            if !active_alarms.is_empty() {
                println!();
                render_alarms(
                    &PageData {
                        data: active_alarms.clone(),
                        total_pages: 1,
                        total_elements: *alarm_count,
                        has_next: false,
                    },
                    0,
                );
            }
        }
    }
}

fn print_node(node: &TopologyNode, depth: usize) {
    println!("{}{} [{}]", "  ".repeat(depth), node.name, node.kind);
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn print_page_footer<T>(page: u32, data: &PageData<T>) {
    let more = if data.has_next { ", more available" } else { "" };
    println!(
        "page {} of {} ({} total{more})",
        page + 1,
        data.total_pages.max(1),
        data.total_elements
    );
}

// === Input helpers ===

async fn print_prompt(session: &Session) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt_label(session).as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// Prompt text showing environment, identity and impersonation state.
fn prompt_label(session: &Session) -> String {
    let env = session
        .active_environment()
        .map_or("no-env", |e| e.name.as_str());
    match session.identity() {
        Some(identity) if session.is_impersonating() => {
            format!("{env} {} (impersonating)> ", identity.email)
        }
        Some(identity) => format!("{env} {}> ", identity.email),
        None => format!("{env}> "),
    }
}

async fn prompt_line(lines: &mut ConsoleInput, prompt: &str) -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;
    Ok(lines
        .next_line()
        .await?
        .unwrap_or_default()
        .trim()
        .to_string())
}

/// Parse optional `[page] [search]` arguments; a non-numeric first argument
/// is treated as part of the search term.
fn parse_page_and_search(args: &[&str]) -> (u32, String) {
    match args {
        [] => (0, String::new()),
        [first, rest @ ..] => match first.parse::<u32>() {
            Ok(page) => (page, rest.join(" ")),
            Err(_) => (0, args.join(" ")),
        },
    }
}

/// Split a `--type <t>` flag out of the argument list.
fn extract_type_flag<'a>(args: &[&'a str]) -> (Vec<&'a str>, Option<&'a str>) {
    let mut positional = Vec::new();
    let mut device_type = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if *arg == "--type" {
            device_type = iter.next().copied();
        } else {
            positional.push(*arg);
        }
    }
    (positional, device_type)
}

/// Clip to `max` characters with a trailing ellipsis.
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Format epoch milliseconds as a date-time, or `-` when absent.
fn format_ms(ms: i64) -> String {
    if ms <= 0 {
        return "-".to_string();
    }
    chrono::DateTime::from_timestamp_millis(ms).map_or_else(
        || "-".to_string(),
        |t| t.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Render a telemetry series as a block-character sparkline.
fn sparkline(points: &[TelemetryPoint]) -> String {
    const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let max = points.iter().map(|p| p.value).max().unwrap_or(0).max(1);
    points
        .iter()
        .map(|p| BLOCKS[((p.value.clamp(0, max) * 7) / max) as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::auth::{Authority, CredentialPair, Identity};

    use super::*;

    fn sysadmin(email: &str) -> Identity {
        Identity {
            email: email.to_string(),
            scopes: vec!["SYS_ADMIN".to_string()],
            user_id: "u1".to_string(),
            tenant_id: "t1".to_string(),
            customer_id: "c1".to_string(),
            enabled: true,
            is_public: false,
            authority: Authority::SysAdmin,
        }
    }

    fn pair() -> CredentialPair {
        CredentialPair {
            token: "tok".to_string(),
            refresh_token: "ref".to_string(),
        }
    }

    #[test]
    fn page_and_search_parsing() {
        assert_eq!(parse_page_and_search(&[]), (0, String::new()));
        assert_eq!(parse_page_and_search(&["3"]), (3, String::new()));
        assert_eq!(parse_page_and_search(&["2", "factory"]), (2, "factory".to_string()));
        assert_eq!(
            parse_page_and_search(&["factory", "north"]),
            (0, "factory north".to_string())
        );
    }

    #[test]
    fn type_flag_extraction() {
        let (positional, device_type) = extract_type_flag(&["1", "--type", "thermostat", "foo"]);
        assert_eq!(positional, vec!["1", "foo"]);
        assert_eq!(device_type, Some("thermostat"));

        let (positional, device_type) = extract_type_flag(&["--type"]);
        assert!(positional.is_empty());
        assert_eq!(device_type, None);
    }

    #[test]
    fn prompt_reflects_session_state() {
        let mut session = Session::default();
        assert_eq!(prompt_label(&session), "no-env> ");

        session.add_environment("Local", "http://localhost:8080");
        assert_eq!(prompt_label(&session), "Local> ");

        session.apply_login(pair(), sysadmin("admin@tb.org"));
        assert_eq!(prompt_label(&session), "Local admin@tb.org> ");

        let mut tenant = sysadmin("t1@tb.org");
        tenant.authority = Authority::TenantAdmin;
        session.begin_impersonation(pair(), tenant);
        assert_eq!(prompt_label(&session), "Local t1@tb.org (impersonating)> ");
    }

    #[test]
    fn adding_an_environment_drops_cached_queries() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::open_at(dir.path().join("environments.json"));

        let mut session = Session::default();
        session.add_environment("First", "http://one:8080");
        session.apply_login(pair(), sysadmin("admin@tb.org"));

        let mut cache = QueryCache::new();
        cache.scope_to(session.identity());
        cache.put("tenants:0:20:", &1u32);

        env_command(&["add", "Second", "http://two:8080"], &mut session, &mut cache, &store)
            .unwrap();
        assert_eq!(cache.get::<u32>("tenants:0:20:"), None);
        // The credentials themselves survive until the user logs in again.
        assert!(session.is_authenticated());
        assert_eq!(
            session.active_environment().map(|e| e.name.clone()),
            Some("Second".to_string())
        );
    }

    #[test]
    fn clip_keeps_short_strings_intact() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("a-very-long-device-name", 10), "a-very-...");
    }

    #[test]
    fn sparkline_stays_within_blocks() {
        let points: Vec<TelemetryPoint> = (0..10)
            .map(|i| TelemetryPoint { ts: i, value: i * 100 })
            .collect();
        let line = sparkline(&points);
        assert_eq!(line.chars().count(), 10);
        assert!(sparkline(&[]).is_empty());
    }
}
