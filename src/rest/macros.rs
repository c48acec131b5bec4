/// Makes a request or server builder directly `.await`able.
///
/// Wraps the builder's `execute`-like method and implements `std::future::IntoFuture`
/// on top of it, so `client.message(to).send(draft).await` and
/// `server.serve(handlers).await` work without an explicit call.
///
/// The future is boxed into a [`futures::future::BoxFuture`] so the `IntoFuture`
/// associated type can be named on stable.
macro_rules! IntoFuture {
    (
        // The `impl` block for the type.
        impl $(<$($lt:lifetime $(,)?)? $($gen:ident),*>)? $name:ident $(<$($lt2:lifetime $(,)?)? $($gen2:ident),*>)?
        $([where $($wheres:tt)*])?
        {
            // The `execute` function to be wrapped.
            $(#[$meta:meta])*
            pub fn $func:ident ( $($args:tt)* ) -> impl Future<Output = $ret:ty> + $fut_life:lifetime $body:block
        }
    ) => {
        impl $(<$($lt,)? $($gen),*>)? $name $(<$($lt2,)? $($gen2),*>)?
        $(where $($wheres)*)?
        {
            $(#[$meta])*
            pub fn $func($($args)*) -> impl ::std::future::Future<Output = $ret> + $fut_life $body
        }

        impl $(<$($lt,)? $($gen),*>)? ::std::future::IntoFuture for $name $(<$($lt2,)? $($gen2),*>)?
        $(where $($wheres)*)?
        {
            type Output = $ret;
            type IntoFuture = ::futures::future::BoxFuture<$fut_life, Self::Output>;

            fn into_future(self) -> Self::IntoFuture {
                Box::pin(self.$func())
            }
        }
    };
}
