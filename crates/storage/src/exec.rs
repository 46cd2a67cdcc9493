//! DB operation interface logic.
//!
//! [`inst_db_ops!`] generates an ops struct exposing each database method as
//! an async call run on a thread pool, a blocking call run locally, and a
//! channel-returning call.

/// Handle for receiving a result from a database operation.
pub(crate) type DbRecv<T> = tokio::sync::oneshot::Receiver<based_db::DbResult<T>>;

/// Generates an ops struct over a database trait.
///
/// ```ignore
/// inst_db_ops! {
///     (<D: HashChainDatabase> => HashChainOps) {
///         get_last_height() => Option<u64>;
///         set_last_height(height: u64) => ();
///     }
/// }
/// ```
///
/// For every method `foo` this produces `foo_async`, `foo_blocking` and
/// `foo_chan`. The generated struct is not generic over the database, the
/// concrete type is erased behind a shim trait object.
macro_rules! inst_db_ops {
    {
        (<$tparam:ident: $tpconstr:path> => $base:ident) {
            $($iname:ident($($aname:ident: $aty:ty),*) => $ret:ty;)*
        }
    } => {
        pub struct $base {
            pool: ::threadpool::ThreadPool,
            inner: ::std::sync::Arc<dyn ShimTrait>,
        }

        impl ::std::fmt::Debug for $base {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($base))
                    .field("pool", &self.pool)
                    .finish_non_exhaustive()
            }
        }

        ::paste::paste! {
            impl $base {
                pub fn new<$tparam: $tpconstr>(
                    pool: ::threadpool::ThreadPool,
                    db: ::std::sync::Arc<$tparam>,
                ) -> Self {
                    Self {
                        pool,
                        inner: ::std::sync::Arc::new(Inner { db }),
                    }
                }

                $(
                    pub async fn [<$iname _async>](&self, $($aname: $aty),*) -> ::based_db::DbResult<$ret> {
                        let resp_rx = self.inner.[<$iname _chan>](&self.pool, $($aname),*);
                        match resp_rx.await {
                            Ok(v) => v,
                            Err(_) => Err(::based_db::DbError::WorkerFailedStrangely),
                        }
                    }

                    pub fn [<$iname _blocking>](&self, $($aname: $aty),*) -> ::based_db::DbResult<$ret> {
                        self.inner.[<$iname _blocking>]($($aname),*)
                    }

                    pub fn [<$iname _chan>](
                        &self,
                        $($aname: $aty),*
                    ) -> ::tokio::sync::oneshot::Receiver<::based_db::DbResult<$ret>> {
                        self.inner.[<$iname _chan>](&self.pool, $($aname),*)
                    }
                )*
            }

            trait ShimTrait: Sync + Send + 'static {
                $(
                    fn [<$iname _blocking>](&self, $($aname: $aty),*) -> ::based_db::DbResult<$ret>;
                    fn [<$iname _chan>](&self, pool: &::threadpool::ThreadPool, $($aname: $aty),*) -> $crate::exec::DbRecv<$ret>;
                )*
            }

            struct Inner<$tparam: $tpconstr> {
                db: ::std::sync::Arc<$tparam>,
            }

            impl<$tparam: $tpconstr> ShimTrait for Inner<$tparam> {
                $(
                    fn [<$iname _blocking>](&self, $($aname: $aty),*) -> ::based_db::DbResult<$ret> {
                        self.db.$iname($($aname),*)
                    }

                    fn [<$iname _chan>](&self, pool: &::threadpool::ThreadPool, $($aname: $aty),*) -> $crate::exec::DbRecv<$ret> {
                        let (resp_tx, resp_rx) = ::tokio::sync::oneshot::channel();
                        let db = self.db.clone();

                        pool.execute(move || {
                            let res = db.$iname($($aname),*);
                            // Release the handle before the caller resumes.
                            drop(db);
                            if resp_tx.send(res).is_err() {
                                ::tracing::warn!(op = stringify!($iname), "failed to send response");
                            }
                        });

                        resp_rx
                    }
                )*
            }
        }
    };
}

pub(crate) use inst_db_ops;
