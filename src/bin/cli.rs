//! erpgate CLI - Main entry point
//!
//! Operator tool for inspecting roles, modules and entitlements, and for
//! running layered access checks against a project's policy.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::Parser;
use erpgate_lib::engine::{
    audit::AuditLog,
    cli::formatter::{flag, format_remaining, CliFormatter},
    cli::{Cli, Commands, OutputFormat, PolicyAction},
    config::Config,
    logging::init_logging,
    rbac::{
        entitlement::trial_expiry_after,
        modules::{modules_in_tier, Module, ModuleTier},
        permissions::PermissionSet,
        AccessRequest, AuthContext, EnforcementLevel, Enforcer, EntitlementStatus, OrgPolicy,
        Role, TrialExpiry,
    },
};
use std::path::{Path, PathBuf};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        CliFormatter::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    let project_dir = cli.get_project_dir();
    let json = cli.format == OutputFormat::Json;

    let log_level = Config::load(&project_dir)
        .map(|c| c.logging.level)
        .unwrap_or_else(|_| "warn".to_string());
    init_logging(&log_level);

    match cli.command {
        Commands::Init { org, name } => {
            let dir = cli
                .project
                .clone()
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
            cmd_init(&dir, &org, name, json)?;
        }
        Commands::Roles => cmd_roles(json),
        Commands::Rank { role } => cmd_rank(&role, json),
        Commands::CanManage { manager, target } => cmd_can_manage(&manager, &target, json),
        Commands::Modules { tier } => cmd_modules(tier.as_deref(), json)?,
        Commands::Entitlement { status, expiry } => cmd_entitlement(&status, expiry, json)?,
        Commands::Permission { pattern, args } => cmd_permission(&pattern, &args, json)?,
        Commands::Check {
            org,
            role,
            module,
            grants,
            require,
            target_role,
            user,
        } => {
            let context = AuthContext::new(user, &org, &role)
                .with_permissions(grants.into_iter().collect::<PermissionSet>());
            let request = AccessRequest {
                organization_id: org,
                module,
                permission: require,
                target_role,
            };
            cmd_check(&project_dir, &context, &request, json)?;
        }
        Commands::Policy { action } => cmd_policy(action, &project_dir, json)?,
        Commands::Audit { level } => cmd_audit(&project_dir, level.as_deref(), json)?,
    }

    Ok(())
}

fn cmd_init(dir: &Path, org: &str, name: Option<String>, json: bool) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let mut config = Config::default_for_org(org);
    config.organization.name = name;
    config.save(dir)?;

    let policy = OrgPolicy::new(org);
    policy.save(&config.policy_dir(dir))?;
    std::fs::create_dir_all(config.audit_dir(dir))?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "success": true,
                "project_dir": dir.display().to_string(),
                "organization_id": org
            })
        );
    } else {
        CliFormatter::success(&format!("Initialized erpgate for organization {}", org));
        CliFormatter::kv("Project", &dir.display().to_string());
        CliFormatter::kv("Policy", &config.policy_dir(dir).display().to_string());
    }
    Ok(())
}

fn cmd_roles(json: bool) {
    if json {
        let roles: Vec<_> = Role::ALL
            .iter()
            .map(|r| {
                serde_json::json!({
                    "role": r.as_str(),
                    "rank": r.rank(),
                    "display_name": r.display_name(),
                    "super_admin": r.is_super_admin(),
                    "org_admin": r.is_org_admin(),
                })
            })
            .collect();
        println!("{}", serde_json::json!({ "roles": roles }));
        return;
    }

    CliFormatter::header("Roles");
    CliFormatter::table_header(&["Role", "Rank", "Name", "Admin"]);
    for role in Role::ALL {
        let admin = if role.is_super_admin() {
            "platform"
        } else if role.is_org_admin() {
            "organization"
        } else {
            "-"
        };
        CliFormatter::table_row(&[
            role.as_str(),
            &role.rank().to_string(),
            role.display_name(),
            admin,
        ]);
    }
}

fn cmd_rank(role: &str, json: bool) {
    let rank = erpgate_lib::rank_of(role);
    if json {
        println!("{}", serde_json::json!({ "role": role, "rank": rank }));
    } else if rank == 0 {
        CliFormatter::warning(&format!("Unrecognized role '{}', rank 0", role));
    } else {
        CliFormatter::kv(role, &rank.to_string());
    }
}

fn cmd_can_manage(manager: &str, target: &str, json: bool) {
    let allowed = erpgate_lib::can_manage(manager, target);
    if json {
        println!(
            "{}",
            serde_json::json!({
                "manager": manager,
                "target": target,
                "can_manage": allowed
            })
        );
    } else {
        CliFormatter::decision(
            allowed,
            &format!(
                "{} ({}) managing {} ({})",
                manager,
                erpgate_lib::rank_of(manager),
                target,
                erpgate_lib::rank_of(target)
            ),
        );
    }
}

fn cmd_modules(tier: Option<&str>, json: bool) -> Result<()> {
    let modules: Vec<Module> = match tier {
        Some(tier) => modules_in_tier(tier.parse::<ModuleTier>()?),
        None => Module::ALL.to_vec(),
    };

    if json {
        let list: Vec<_> = modules
            .iter()
            .map(|m| {
                serde_json::json!({
                    "module": m.as_str(),
                    "tier": m.tier(),
                    "always_on": m.is_always_on(),
                    "rbac_only": m.is_rbac_only(),
                })
            })
            .collect();
        println!("{}", serde_json::json!({ "modules": list }));
        return Ok(());
    }

    CliFormatter::header("Modules");
    CliFormatter::table_header(&["Module", "Tier", "Always on", "RBAC only"]);
    for module in modules {
        CliFormatter::table_row(&[
            module.as_str(),
            module.tier().as_str(),
            flag(module.is_always_on()),
            flag(module.is_rbac_only()),
        ]);
    }
    Ok(())
}

fn cmd_entitlement(status: &str, expiry: Option<String>, json: bool) -> Result<()> {
    let status = EntitlementStatus::parse_strict(status)?;
    let expiry = expiry.map(TrialExpiry::from);
    let now = Utc::now();
    let enabled = erpgate_lib::is_module_enabled(status, expiry.as_ref(), now);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": status,
                "enabled": enabled,
                "evaluated_at": now.to_rfc3339()
            })
        );
        return Ok(());
    }

    CliFormatter::decision(enabled, &format!("status {}", status));
    if let Some(Ok(expires_at)) = expiry.as_ref().map(|e| e.resolve()) {
        CliFormatter::kv(
            "Trial remaining",
            &format_remaining((expires_at - now).num_seconds()),
        );
    }
    Ok(())
}

fn cmd_permission(pattern: &str, args: &[String], json: bool) -> Result<()> {
    let args: Vec<&str> = args.iter().map(|a| a.as_str()).collect();
    let key = erpgate_lib::try_format_permission(pattern, &args)?;
    if json {
        println!("{}", serde_json::json!({ "pattern": pattern, "permission": key }));
    } else {
        println!("{}", key);
    }
    Ok(())
}

fn load_project(project_dir: &Path) -> Result<(Config, OrgPolicy)> {
    let config = Config::load(project_dir)
        .with_context(|| format!("no erpgate project at {}", project_dir.display()))?;
    let policy = OrgPolicy::load(&config.policy_dir(project_dir), &config.organization.id)?;
    Ok((config, policy))
}

fn cmd_check(
    project_dir: &Path,
    context: &AuthContext,
    request: &AccessRequest,
    json: bool,
) -> Result<()> {
    let (config, policy) = load_project(project_dir)?;
    let enforcer = Enforcer::new(&policy);
    let result = enforcer.authorize(context, request);

    let audit = AuditLog::new(&config.audit_dir(project_dir))?;
    audit.record_denial(context, request, &result)?;

    if json {
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }

    match (&result.level, &result.reason) {
        (Some(level), Some(reason)) => {
            CliFormatter::decision(false, &format!("[{}] {}", level, reason));
        }
        _ => CliFormatter::decision(true, &format!("{} on {}", context.role, request.module)),
    }
    Ok(())
}

fn cmd_policy(action: PolicyAction, project_dir: &Path, json: bool) -> Result<()> {
    let (config, mut policy) = load_project(project_dir)?;
    let policy_dir = config.policy_dir(project_dir);

    let changed = match action {
        PolicyAction::Show => false,
        PolicyAction::Enable { module } => {
            policy.set_status(module.parse()?, EntitlementStatus::Enabled);
            true
        }
        PolicyAction::Disable { module } => {
            policy.set_status(module.parse()?, EntitlementStatus::Disabled);
            true
        }
        PolicyAction::Trial { module, days } => {
            let module: Module = module.parse()?;
            if module.is_rbac_only() {
                return Err(anyhow!("{} is gated by role only and has no entitlement", module));
            }
            let expires_at = days
                .map(|d| trial_expiry_after(Utc::now(), d))
                .transpose()
                .with_context(|| format!("cannot start a trial for {}", module))?;
            policy.start_trial(module, expires_at);
            true
        }
    };

    if changed {
        policy.save(&policy_dir)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&policy)?);
        return Ok(());
    }

    if changed {
        CliFormatter::success("Policy updated");
    }
    let now = Utc::now();
    CliFormatter::header(&format!("Entitlements for {}", policy.organization_id));
    CliFormatter::table_header(&["Module", "Status", "Usable", "Trial ends"]);
    let mut entitlements = policy.entitlements.clone();
    entitlements.sort_by_key(|e| e.module);
    for e in &entitlements {
        let trial_end = e
            .trial_expires_at
            .map(|at| format_remaining((at - now).num_seconds()))
            .unwrap_or_else(|| "-".to_string());
        CliFormatter::table_row(&[
            e.module.as_str(),
            e.status.as_str(),
            flag(policy.module_enabled_at(e.module, now)),
            &trial_end,
        ]);
    }
    Ok(())
}

fn cmd_audit(project_dir: &Path, level: Option<&str>, json: bool) -> Result<()> {
    let (config, _) = load_project(project_dir)?;
    let audit = AuditLog::new(&config.audit_dir(project_dir))?;

    let entries = match level {
        Some(level) => {
            let level: EnforcementLevel = level.parse().map_err(|e: String| anyhow!(e))?;
            audit.query_by_level(level)?
        }
        None => audit.query_all()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    CliFormatter::header("Recorded denials");
    if entries.is_empty() {
        CliFormatter::info("No denials recorded");
        return Ok(());
    }
    CliFormatter::table_header(&["Time", "Actor", "Module", "Level"]);
    for e in &entries {
        CliFormatter::table_row(&[
            &e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            e.actor.as_deref().unwrap_or("-"),
            &e.module,
            e.level.map(|l| l.as_str()).unwrap_or("-"),
        ]);
    }
    Ok(())
}
