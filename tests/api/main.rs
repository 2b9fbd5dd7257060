mod fines;
mod health_check;
mod helpers;
