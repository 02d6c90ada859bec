//! Teams client implementation.
//!
//! Provides the main entry point for interacting with the Graph API. All
//! services are assembled here and share one transport, one credential
//! source and one request executor.

use crate::auth::{AuthManager, TokenProvider};
use crate::config::TeamsConfig;
use crate::errors::TeamsResult;
use crate::observability::ExecutorMetrics;
use crate::resilience::RequestExecutor;
use crate::resolver::ReferenceResolver;
use crate::services::{
    ChannelsService, ChannelsServiceTrait, MessagesService, MessagesServiceTrait, SearchService,
    SearchServiceTrait, ServiceContext, TeamsService, TeamsServiceTrait,
};
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;

/// Trait defining the Teams client interface
pub trait TeamsClient: Send + Sync {
    /// Get the configuration
    fn config(&self) -> &TeamsConfig;

    /// Get the authentication manager
    fn auth_manager(&self) -> &AuthManager;

    /// Get the teams service
    fn teams(&self) -> &dyn TeamsServiceTrait;

    /// Get the channels service
    fn channels(&self) -> &dyn ChannelsServiceTrait;

    /// Get the messages service
    fn messages(&self) -> &dyn MessagesServiceTrait;

    /// Get the search service
    fn search(&self) -> &dyn SearchServiceTrait;

    /// Get the reference resolver
    fn resolver(&self) -> &ReferenceResolver;

    /// Get the executor metrics
    fn metrics(&self) -> &ExecutorMetrics;
}

/// Main Teams client implementation
pub struct TeamsClientImpl {
    config: Arc<TeamsConfig>,
    auth: AuthManager,
    executor: Arc<RequestExecutor>,
    teams_service: Arc<TeamsService>,
    channels_service: Arc<ChannelsService>,
    messages_service: Arc<MessagesService>,
    search_service: SearchService,
    resolver: ReferenceResolver,
}

impl TeamsClientImpl {
    /// Create a new client using the static token from the configuration
    pub fn new(config: TeamsConfig) -> TeamsResult<Self> {
        config.validate()?;
        let auth = AuthManager::from_config(&config)?;
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        Ok(Self::assemble(config, transport, auth))
    }

    /// Create a new client with a custom credential provider
    pub fn with_token_provider(
        config: TeamsConfig,
        provider: Arc<dyn TokenProvider>,
    ) -> TeamsResult<Self> {
        config.validate()?;
        let auth = AuthManager::new(provider, &config);
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        Ok(Self::assemble(config, transport, auth))
    }

    /// Create a new client with a custom transport and credential provider
    pub fn with_transport(
        config: TeamsConfig,
        transport: Arc<dyn HttpTransport>,
        provider: Arc<dyn TokenProvider>,
    ) -> Self {
        let auth = AuthManager::new(provider, &config);
        Self::assemble(config, transport, auth)
    }

    fn assemble(config: TeamsConfig, transport: Arc<dyn HttpTransport>, auth: AuthManager) -> Self {
        let config = Arc::new(config);
        let executor = Arc::new(RequestExecutor::new(config.attempt_config()));
        let context = ServiceContext::new(
            transport,
            auth.clone(),
            config.build_url(""),
            executor.clone(),
        );

        let teams_service = Arc::new(TeamsService::new(context.clone()));
        let channels_service = Arc::new(ChannelsService::new(context.clone()));
        let messages_service = Arc::new(MessagesService::new(context.clone()));
        let search_service = SearchService::new(
            context,
            messages_service.clone(),
            config.search.clone(),
        );
        let resolver = ReferenceResolver::new(teams_service.clone(), channels_service.clone());

        Self {
            config,
            auth,
            executor,
            teams_service,
            channels_service,
            messages_service,
            search_service,
            resolver,
        }
    }

    /// Get the concrete search service, which also offers custom enrichment
    pub fn search_service(&self) -> &SearchService {
        &self.search_service
    }

    /// Get the request executor
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }
}

impl TeamsClient for TeamsClientImpl {
    fn config(&self) -> &TeamsConfig {
        &self.config
    }

    fn auth_manager(&self) -> &AuthManager {
        &self.auth
    }

    fn teams(&self) -> &dyn TeamsServiceTrait {
        self.teams_service.as_ref()
    }

    fn channels(&self) -> &dyn ChannelsServiceTrait {
        self.channels_service.as_ref()
    }

    fn messages(&self) -> &dyn MessagesServiceTrait {
        self.messages_service.as_ref()
    }

    fn search(&self) -> &dyn SearchServiceTrait {
        &self.search_service
    }

    fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    fn metrics(&self) -> &ExecutorMetrics {
        self.executor.metrics()
    }
}

impl std::fmt::Debug for TeamsClientImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamsClientImpl")
            .field("config", &self.config)
            .field("auth", &self.auth)
            .finish()
    }
}
