//! Repository, privilege and role provisioning against Nexus.
//!
//! CREATE runs repository → privilege → role/user → IQ Server grant.
//! DELETE runs role/user → IQ Server revoke → privilege → repository.
//!
//! Each step is idempotent on its own. The first failing step aborts the
//! sequence and completed steps are left in place; no compensating actions
//! are attempted. IQ Server steps are best-effort and only log on failure.

use crate::error::{ManagerError, Result};
use crate::models::{Action, OperationConfig};
use crate::remote::{IqServerClient, NexusClient};

/// Executes one create or delete operation.
pub struct PrivilegeManager<'a> {
    config: &'a OperationConfig,
    nexus: NexusClient,
    iq: IqServerClient,
}

impl<'a> PrivilegeManager<'a> {
    /// Creates a manager with clients for the configured remote systems.
    pub fn new(config: &'a OperationConfig) -> Result<Self> {
        Ok(Self {
            nexus: NexusClient::new(&config.system.nexus)?,
            iq: IqServerClient::new(&config.system.iq_server)?,
            config,
        })
    }

    /// Executes the configured action.
    pub async fn run(&self) -> Result<()> {
        tracing::info!(
            action = %self.config.action,
            repository = %self.config.repository_name,
            role = %self.config.role_name,
            "Running Nexus repository operation"
        );

        match self.config.action {
            Action::Create => self.create_resources().await?,
            Action::Delete => self.delete_resources().await?,
        }

        tracing::info!(
            action = %self.config.action,
            repository = %self.config.repository_name,
            "Nexus repository operation completed"
        );
        Ok(())
    }

    async fn create_resources(&self) -> Result<()> {
        let mut completed = Vec::new();

        self.ensure_repository()
            .await
            .inspect_err(|e| self.log_abort(&completed, e))?;
        completed.push("repository");

        self.ensure_privilege()
            .await
            .inspect_err(|e| self.log_abort(&completed, e))?;
        completed.push("privilege");

        self.setup_role_and_user()
            .await
            .inspect_err(|e| self.log_abort(&completed, e))?;

        self.setup_iq_server_role().await;
        Ok(())
    }

    async fn delete_resources(&self) -> Result<()> {
        let mut completed = Vec::new();

        self.cleanup_role()
            .await
            .inspect_err(|e| self.log_abort(&completed, e))?;
        completed.push("role");

        self.cleanup_iq_server_role().await;

        let existed = self
            .nexus
            .delete_privilege(&self.config.privilege_name)
            .await
            .inspect_err(|e| self.log_abort(&completed, e))?;
        if !existed {
            tracing::info!("Privilege {} already absent", self.config.privilege_name);
        }
        completed.push("privilege");

        let existed = self
            .nexus
            .delete_repository(&self.config.repository_name)
            .await
            .inspect_err(|e| self.log_abort(&completed, e))?;
        if !existed {
            tracing::info!("Repository {} already absent", self.config.repository_name);
        }
        Ok(())
    }

    fn log_abort(&self, completed: &[&str], error: &ManagerError) {
        tracing::warn!(
            action = %self.config.action,
            repository = %self.config.repository_name,
            completed = ?completed,
            "Operation aborted, completed steps were not rolled back: {}",
            error
        );
    }

    /// Creates the proxy repository unless an equivalent one already exists.
    async fn ensure_repository(&self) -> Result<()> {
        let name = &self.config.repository_name;

        let Some(existing) = self.nexus.get_repository(name).await? else {
            tracing::info!("Creating repository {}", name);
            return self
                .nexus
                .create_proxy_repository(
                    name,
                    &self.config.format,
                    &self.config.proxy_endpoint,
                    &self.config.remote_url,
                )
                .await;
        };

        if let Some(format) = existing.format.as_deref()
            && !format.eq_ignore_ascii_case(&self.config.format.name)
        {
            return Err(ManagerError::Conflict(format!(
                "Repository '{}' exists with format '{}', expected '{}'",
                name, format, self.config.format.name
            )));
        }

        if let Some(kind) = existing.repository_type.as_deref()
            && kind != "proxy"
        {
            return Err(ManagerError::Conflict(format!(
                "Repository '{}' exists as a {} repository, expected proxy",
                name, kind
            )));
        }

        if let Some(remote_url) = existing.remote_url()
            && !same_url(remote_url, &self.config.remote_url)
        {
            return Err(ManagerError::Conflict(format!(
                "Repository '{}' proxies '{}', expected '{}'",
                name, remote_url, self.config.remote_url
            )));
        }

        tracing::info!("Repository {} exists", name);
        Ok(())
    }

    /// Creates the repository-view privilege unless it already exists for this repository.
    async fn ensure_privilege(&self) -> Result<()> {
        let name = &self.config.privilege_name;

        let Some(existing) = self.nexus.get_privilege(name).await? else {
            tracing::info!("Creating privilege {}", name);
            return self
                .nexus
                .create_privilege(name, &self.config.repository_name, &self.config.format)
                .await;
        };

        if let Some(repository) = existing.repository.as_deref()
            && repository != self.config.repository_name
        {
            return Err(ManagerError::Conflict(format!(
                "Privilege '{}' exists for repository '{}', expected '{}'",
                name, repository, self.config.repository_name
            )));
        }

        tracing::info!("Privilege {} exists", name);
        Ok(())
    }

    /// Ensures the user's role holds the privilege and the user holds the role
    /// plus every extra role.
    async fn setup_role_and_user(&self) -> Result<()> {
        let config = self.config;

        match self.nexus.get_role(&config.role_name).await? {
            None => {
                tracing::info!("Creating role {}", config.role_name);
                self.nexus
                    .create_role(
                        &config.role_name,
                        &format!("Role for {}", config.ldap_username),
                        std::slice::from_ref(&config.privilege_name),
                    )
                    .await?;
            }
            Some(mut role) if !role.privileges.contains(&config.privilege_name) => {
                tracing::info!("Adding privilege {} to role {}", config.privilege_name, role.id);
                role.privileges.push(config.privilege_name.clone());
                self.nexus.update_role(&role).await?;
            }
            Some(_) => {
                tracing::info!("Role {} already holds privilege", config.role_name);
            }
        }

        let mut user = self
            .nexus
            .get_user(&config.ldap_username)
            .await?
            .ok_or_else(|| {
                ManagerError::Remote(format!("User '{}' not found", config.ldap_username))
            })?;

        let required = std::iter::once(&config.role_name).chain(config.extra_roles.iter());
        let missing: Vec<String> = required
            .filter(|role| !user.roles.contains(role))
            .cloned()
            .collect();

        if missing.is_empty() {
            tracing::info!("User {} has required roles", user.user_id);
            return Ok(());
        }

        tracing::info!("Adding roles {:?} to user {}", missing, user.user_id);
        user.roles.extend(missing);
        user.roles.sort();
        user.roles.dedup();
        self.nexus.update_user(&user).await
    }

    /// Removes the privilege from the user's role, deleting the role (and
    /// unbinding it from the user) once it holds nothing else.
    async fn cleanup_role(&self) -> Result<()> {
        let config = self.config;

        let Some(mut role) = self.nexus.get_role(&config.role_name).await? else {
            tracing::info!("Role {} already absent", config.role_name);
            return Ok(());
        };

        if !role.privileges.contains(&config.privilege_name) {
            return Ok(());
        }
        role.privileges.retain(|p| p != &config.privilege_name);

        if !role.privileges.is_empty() {
            tracing::info!("Removing privilege {} from role {}", config.privilege_name, role.id);
            return self.nexus.update_role(&role).await;
        }

        if let Some(mut user) = self.nexus.get_user(&config.ldap_username).await?
            && user.roles.contains(&config.role_name)
        {
            tracing::info!("Unbinding role {} from user {}", config.role_name, user.user_id);
            user.roles.retain(|r| r != &config.role_name);
            self.nexus.update_user(&user).await?;
        }

        tracing::info!("Deleting empty role {}", config.role_name);
        self.nexus.delete_role(&config.role_name).await?;
        Ok(())
    }

    async fn setup_iq_server_role(&self) {
        if self.config.organization_id.is_empty() {
            tracing::warn!("No organization id configured, skipping IQ Server role");
            return;
        }

        let result = async {
            let Some(owner_role_id) = self.iq.find_owner_role_id().await? else {
                tracing::warn!("Owner role not found in IQ Server");
                return Ok(());
            };
            self.iq
                .grant_role_to_user(&self.config.organization_id, &owner_role_id, &self.config.ldap_username)
                .await?;
            tracing::info!("IQ Server role granted to {}", self.config.ldap_username);
            Ok::<_, ManagerError>(())
        }
        .await;

        if let Err(e) = result {
            tracing::warn!("IQ Server setup failed: {}", e);
        }
    }

    async fn cleanup_iq_server_role(&self) {
        if self.config.organization_id.is_empty() {
            return;
        }

        let result = async {
            if let Some(owner_role_id) = self.iq.find_owner_role_id().await? {
                self.iq
                    .revoke_role_from_user(&self.config.organization_id, &owner_role_id, &self.config.ldap_username)
                    .await?;
            }
            Ok::<_, ManagerError>(())
        }
        .await;

        if let Err(e) = result {
            tracing::warn!("IQ Server cleanup failed: {}", e);
        }
    }
}

fn same_url(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}
