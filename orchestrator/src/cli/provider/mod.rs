pub mod vercel;
