//! GraphQL documents for the remote API
//!
//! The field sets here are a wire contract: the repository's normalization
//! and the metrics computation both assume exactly these selections.

/// All stacks with embedded runs and resources, flat-array form.
///
/// The optimized fetch: one round trip retrieves everything the metrics
/// computation needs.
pub const STACKS: &str = r#"
query GetAllStacksWithMetrics {
  stacks {
    id
    name
    description
    state
    administrative
    autodeploy
    autoretry
    repository
    branch
    provider
    space
    labels
    entities {
      id
      name
      type
    }
    runs {
      id
      state
      type
      createdAt
      updatedAt
      title
      triggeredBy
      commit {
        hash
        message
        authorName
        timestamp
      }
    }
  }
}
"#;

/// All stacks with embedded runs and resources, paginated edge/node form.
///
/// Variables: `first: Int!`. Deployments fronted by a backend proxy expose
/// this shape; `space` comes back as a nested identity object here.
pub const STACKS_PAGINATED: &str = r#"
query GetAllStacksWithMetrics($first: Int!) {
  stacks(first: $first) {
    edges {
      node {
        id
        name
        description
        state
        administrative
        autodeploy
        autoretry
        repository
        branch
        provider
        space {
          id
        }
        labels
        entities {
          id
          name
          type
        }
        runs {
          id
          state
          type
          createdAt
          updatedAt
          title
          triggeredBy
          commit {
            hash
            message
            authorName
            timestamp
          }
        }
      }
    }
  }
}
"#;

/// A single stack without run history. Variables: `id: ID!`.
pub const STACK: &str = r#"
query GetStack($id: ID!) {
  stack(id: $id) {
    id
    name
    description
    state
    administrative
    autodeploy
    autoretry
    repository
    branch
    provider
    space
    labels
    entities {
      id
      name
      type
    }
  }
}
"#;

/// Run history and resources for one stack. Variables: `stack: ID!`.
///
/// The per-stack fallback issued when the optimized fetch did not embed
/// run data.
pub const STACK_RUNS: &str = r#"
query GetStackRuns($stack: ID!) {
  stack(id: $stack) {
    runs {
      id
      state
      type
      createdAt
      updatedAt
      title
      triggeredBy
      commit {
        hash
        message
        authorName
        timestamp
      }
    }
    entities {
      id
      name
      type
    }
  }
}
"#;

/// Credential exchange: trade an API key id/secret for a JWT.
/// Variables: `id: ID!`, `secret: String!`.
pub const API_KEY_USER: &str = r#"
mutation ApiKeyUser($id: ID!, $secret: String!) {
  apiKeyUser(id: $id, secret: $secret) {
    jwt
  }
}
"#;

/// Trigger a run against a stack. Variables: `stack: ID!`.
pub const RUN_TRIGGER: &str = r#"
mutation TriggerRun($stack: ID!) {
  runTrigger(stack: $stack) {
    id
  }
}
"#;
