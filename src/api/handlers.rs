//! REST API handlers for ledger operations

use crate::ledger::{Account, LedgerError, LedgerEvent, SharedLedger};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

/// Header carrying the caller identity supplied by the host
pub const CALLER_HEADER: &str = "x-caller";

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub ledger: SharedLedger,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TokenInfoResponse {
    pub name: String,
    pub ticker: String,
    pub total_supply: u64,
    pub owner: String,
}

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub creator: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: u64,
}

#[derive(Debug, Serialize)]
pub struct AllowanceResponse {
    pub owner: String,
    pub spender: String,
    pub allowance: u64,
}

/// Outcome of a mutating operation
#[derive(Debug, Serialize)]
pub struct OperationResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct InitializeRequest {
    pub name: String,
    pub ticker: String,
    pub total_supply: u64,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub to: String,
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub spender: String,
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct TransferFromRequest {
    pub from: String,
    pub to: String,
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub to: String,
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct BurnRequest {
    pub from: String,
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    pub address: String,
}

/// Allowance query params
#[derive(Debug, Deserialize)]
pub struct AllowanceQuery {
    pub owner: String,
    pub spender: String,
}

// ============================================================================
// Helpers
// ============================================================================

fn api_error(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: error.into(),
        }),
    )
}

/// Extract the caller identity from the request headers
fn caller(headers: &HeaderMap) -> Result<String, (StatusCode, Json<ApiError>)> {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            api_error(
                StatusCode::UNAUTHORIZED,
                format!("Missing {} header", CALLER_HEADER),
            )
        })
}

fn ledger_error(e: LedgerError) -> (StatusCode, Json<ApiError>) {
    let status = match &e {
        LedgerError::AnonymousCaller => StatusCode::UNAUTHORIZED,
        LedgerError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        LedgerError::CallerAccountNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, e.to_string())
}

fn operation(result: Result<bool, LedgerError>) -> ApiResult<OperationResponse> {
    result
        .map(|success| Json(OperationResponse { success }))
        .map_err(ledger_error)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health - Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /api/token - Token metadata
pub async fn get_token_info(State(state): State<ApiState>) -> Json<TokenInfoResponse> {
    let info = state.ledger.info().await;

    Json(TokenInfoResponse {
        name: info.name,
        ticker: info.ticker,
        total_supply: info.total_supply,
        owner: info.creator,
    })
}

/// POST /api/initialize - Initialize the token
pub async fn initialize(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<InitializeRequest>,
) -> ApiResult<InitializeResponse> {
    let caller = caller(&headers)?;

    let creator = state
        .ledger
        .initialize(&caller, &req.name, &req.ticker, req.total_supply)
        .await
        .map_err(ledger_error)?;

    Ok(Json(InitializeResponse { creator }))
}

/// GET /api/balances/{address} - Balance of an address
pub async fn get_balance(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Json<BalanceResponse> {
    let balance = state.ledger.balance_of(&address).await;
    Json(BalanceResponse { address, balance })
}

/// POST /api/transfer - Transfer from the caller
pub async fn transfer(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<TransferRequest>,
) -> ApiResult<OperationResponse> {
    let caller = caller(&headers)?;
    operation(state.ledger.transfer(&caller, &req.to, req.amount).await)
}

/// POST /api/approve - Approve a spender
pub async fn approve(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<ApproveRequest>,
) -> ApiResult<OperationResponse> {
    let caller = caller(&headers)?;
    operation(state.ledger.approve(&caller, &req.spender, req.amount).await)
}

/// GET /api/allowance?owner=&spender= - Allowance lookup
pub async fn get_allowance(
    State(state): State<ApiState>,
    Query(query): Query<AllowanceQuery>,
) -> Json<AllowanceResponse> {
    let allowance = state.ledger.allowance(&query.owner, &query.spender).await;

    Json(AllowanceResponse {
        owner: query.owner,
        spender: query.spender,
        allowance,
    })
}

/// GET /api/allowance/{owner} - Allowance granted by `owner` to the caller
pub async fn get_allowance_from(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(owner): Path<String>,
) -> ApiResult<AllowanceResponse> {
    let spender = caller(&headers)?;

    let allowance = state
        .ledger
        .allowance_from(&spender, &owner)
        .await
        .map_err(ledger_error)?;

    Ok(Json(AllowanceResponse {
        owner,
        spender,
        allowance,
    }))
}

/// POST /api/transfer-from - Delegated transfer by the caller
pub async fn transfer_from(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<TransferFromRequest>,
) -> ApiResult<OperationResponse> {
    let caller = caller(&headers)?;
    operation(
        state
            .ledger
            .transfer_from(&caller, &req.from, &req.to, req.amount)
            .await,
    )
}

/// POST /api/mint - Mint new tokens (admin only)
pub async fn mint(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<MintRequest>,
) -> ApiResult<OperationResponse> {
    let caller = caller(&headers)?;
    operation(state.ledger.mint(&caller, &req.to, req.amount).await)
}

/// POST /api/burn - Burn approved tokens (admin only)
pub async fn burn(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<BurnRequest>,
) -> ApiResult<OperationResponse> {
    let caller = caller(&headers)?;
    operation(state.ledger.burn(&caller, &req.from, req.amount).await)
}

/// GET /api/admins - List admins
pub async fn list_admins(State(state): State<ApiState>) -> Json<Vec<String>> {
    Json(state.ledger.admins().await)
}

/// POST /api/admins - Add an admin
pub async fn add_admin(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(req): Json<AdminRequest>,
) -> ApiResult<OperationResponse> {
    let caller = caller(&headers)?;
    operation(state.ledger.add_admin(&caller, &req.address).await)
}

/// DELETE /api/admins/{address} - Remove an admin (creator only)
pub async fn delete_admin(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(address): Path<String>,
) -> ApiResult<OperationResponse> {
    let caller = caller(&headers)?;
    operation(state.ledger.delete_admin(&caller, &address).await)
}

/// GET /api/accounts - All accounts
pub async fn list_accounts(State(state): State<ApiState>) -> Json<Vec<Account>> {
    Json(state.ledger.accounts().await)
}

/// GET /api/history - Recent ledger events
pub async fn get_history(State(state): State<ApiState>) -> Json<Vec<LedgerEvent>> {
    Json(state.ledger.history().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use axum::http::HeaderValue;

    fn headers_for(caller: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CALLER_HEADER, HeaderValue::from_str(caller).unwrap());
        headers
    }

    async fn create_state() -> ApiState {
        let state = ApiState {
            ledger: SharedLedger::new(Ledger::new()),
        };

        initialize(
            State(state.clone()),
            headers_for("alice"),
            Json(InitializeRequest {
                name: "Coin".to_string(),
                ticker: "CN".to_string(),
                total_supply: 1000,
            }),
        )
        .await
        .unwrap();

        state
    }

    #[tokio::test]
    async fn test_token_info() {
        let state = create_state().await;

        let Json(info) = get_token_info(State(state)).await;
        assert_eq!(info.name, "Coin");
        assert_eq!(info.ticker, "CN");
        assert_eq!(info.total_supply, 1000);
        assert_eq!(info.owner, "alice");
    }

    #[tokio::test]
    async fn test_transfer_and_balance() {
        let state = create_state().await;

        let Json(resp) = transfer(
            State(state.clone()),
            headers_for("alice"),
            Json(TransferRequest {
                to: "bob".to_string(),
                amount: 300,
            }),
        )
        .await
        .unwrap();
        assert!(resp.success);

        let Json(balance) = get_balance(State(state), Path("bob".to_string())).await;
        assert_eq!(balance.balance, 300);
    }

    #[tokio::test]
    async fn test_business_failure_is_not_an_error() {
        let state = create_state().await;

        let Json(resp) = transfer(
            State(state),
            headers_for("alice"),
            Json(TransferRequest {
                to: "bob".to_string(),
                amount: 5000,
            }),
        )
        .await
        .unwrap();
        assert!(!resp.success);
    }

    #[tokio::test]
    async fn test_missing_caller_header() {
        let state = create_state().await;

        let result = transfer(
            State(state),
            HeaderMap::new(),
            Json(TransferRequest {
                to: "bob".to_string(),
                amount: 1,
            }),
        )
        .await;

        assert_eq!(result.err().unwrap().0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_mint_by_non_admin_is_forbidden() {
        let state = create_state().await;

        let result = mint(
            State(state.clone()),
            headers_for("bob"),
            Json(MintRequest {
                to: "alice".to_string(),
                amount: 10,
            }),
        )
        .await;

        assert_eq!(result.err().unwrap().0, StatusCode::FORBIDDEN);
        assert_eq!(state.ledger.total_supply().await, 1000);
    }

    #[tokio::test]
    async fn test_approve_and_allowance_from() {
        let state = create_state().await;

        approve(
            State(state.clone()),
            headers_for("alice"),
            Json(ApproveRequest {
                spender: "carol".to_string(),
                amount: 100,
            }),
        )
        .await
        .unwrap();

        let Json(resp) = get_allowance_from(
            State(state.clone()),
            headers_for("carol"),
            Path("alice".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(resp.allowance, 100);

        let Json(resp) = get_allowance(
            State(state),
            Query(AllowanceQuery {
                owner: "alice".to_string(),
                spender: "bob".to_string(),
            }),
        )
        .await;
        assert_eq!(resp.allowance, 0);
    }

    #[tokio::test]
    async fn test_admin_management() {
        let state = create_state().await;

        add_admin(
            State(state.clone()),
            headers_for("alice"),
            Json(AdminRequest {
                address: "bob".to_string(),
            }),
        )
        .await
        .unwrap();

        let Json(admins) = list_admins(State(state.clone())).await;
        assert_eq!(admins, vec!["alice".to_string(), "bob".to_string()]);

        let result = delete_admin(
            State(state.clone()),
            headers_for("bob"),
            Path("alice".to_string()),
        )
        .await;
        assert_eq!(result.err().unwrap().0, StatusCode::FORBIDDEN);

        delete_admin(
            State(state.clone()),
            headers_for("alice"),
            Path("bob".to_string()),
        )
        .await
        .unwrap();

        let Json(admins) = list_admins(State(state)).await;
        assert_eq!(admins, vec!["alice".to_string()]);
    }
}
