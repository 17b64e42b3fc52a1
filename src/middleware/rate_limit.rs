use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Fixed-window policy: 100 requests per 15 minutes per client.
pub const MAX_REQUESTS: u32 = 100;
pub const WINDOW: Duration = Duration::from_secs(15 * 60);

struct WindowSlot {
    window_start: Instant,
    count: u32,
}

/// Shared counter map, one slot per client key. Constructed once in `main`
/// and cloned into each worker instead of living in a global.
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    slots: Arc<Mutex<HashMap<String, WindowSlot>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts a hit for `key` at `now`; false means the window is full.
    /// A stale window restarts from scratch rather than sliding.
    pub fn check(&self, key: &str, now: Instant) -> bool {
        let mut slots = match self.slots.lock() {
            Ok(guard) => guard,
            // A poisoned counter should never take the API down.
            Err(poisoned) => poisoned.into_inner(),
        };

        // Lapsed windows are dropped outright, so the map holds one entry
        // per client seen in the current window, not per client ever seen.
        slots.retain(|_, slot| now.duration_since(slot.window_start) < self.window);

        let slot = slots.entry(key.to_string()).or_insert(WindowSlot {
            window_start: now,
            count: 0,
        });

        if slot.count >= self.max_requests {
            return false;
        }
        slot.count += 1;
        true
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.slots.lock().expect("counter lock").len()
    }
}

fn too_many_requests() -> Error {
    let response =
        HttpResponse::TooManyRequests().json(serde_json::json!({ "error": "Too many requests" }));
    actix_web::error::InternalError::from_response("Too many requests".to_string(), response).into()
}

/// Cross-cutting request cap applied ahead of route logic. `/health` stays
/// reachable for probes regardless of the counter.
pub struct RateLimit {
    limiter: RateLimiter,
}

impl RateLimit {
    pub fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.path() != "/health" {
            let key = req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
                .to_string();

            if !self.limiter.check(&key, Instant::now()) {
                log::warn!("⛔ Rate limit exceeded for {}", key);
                return Box::pin(async move { Err(too_many_requests()) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_blocks() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check("1.2.3.4", now));
        assert!(limiter.check("1.2.3.4", now));
        assert!(limiter.check("1.2.3.4", now));
        assert!(!limiter.check("1.2.3.4", now));
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check("1.2.3.4", now));
        assert!(limiter.check("5.6.7.8", now));
        assert!(!limiter.check("1.2.3.4", now));
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check("1.2.3.4", start));
        assert!(!limiter.check("1.2.3.4", start + Duration::from_secs(59)));
        assert!(limiter.check("1.2.3.4", start + Duration::from_secs(60)));
    }

    #[test]
    fn stale_clients_are_evicted_from_the_map() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check("1.2.3.4", start));
        assert!(limiter.check("5.6.7.8", start + Duration::from_secs(30)));
        assert_eq!(limiter.tracked_clients(), 2);

        // Both earlier windows have lapsed by now.
        assert!(limiter.check("9.9.9.9", start + Duration::from_secs(90)));
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
